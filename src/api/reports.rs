use std::sync::Arc;

use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::{Res, api::AppState};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Genre counts across artists observed within the report window.
pub async fn analyze(Extension(state): Extension<Arc<AppState>>) -> Res<Json<Value>> {
    let genres = state.store().aggregate_genres_since(state.report_window).await?;
    let window_days = state.report_window.as_secs() / SECS_PER_DAY;

    tracing::info!(window_days, genres = genres.len(), "report.genres");
    for genre in &genres {
        tracing::info!(genre = %genre.name, count = genre.count, "report.genre");
    }

    Ok(Json(json!({
        "window_days": window_days,
        "genres": genres,
    })))
}

/// Dumps the stored artists and the genre membership counts.
pub async fn fetch_data(Extension(state): Extension<Arc<AppState>>) -> Res<Json<Value>> {
    let artists = state.store().list_stored_artists().await?;
    let genres = state.store().list_stored_genre_counts().await?;

    Ok(Json(json!({
        "artists": artists,
        "genres": genres,
    })))
}

pub async fn ranks(Extension(state): Extension<Arc<AppState>>) -> Res<Json<Value>> {
    let user = state.require_current_user().await?;
    let ranks = state.store().list_user_ranks(&user.user_id).await?;

    Ok(Json(json!({
        "user_id": user.user_id,
        "display_name": user.display_name,
        "ranks": ranks,
    })))
}
