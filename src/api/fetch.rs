use std::sync::Arc;

use axum::{Extension, Json};

use crate::{Res, api::AppState, types::FetchSummary};

/// Runs a fetch cycle for the current user right away.
pub async fn top_artists(Extension(state): Extension<Arc<AppState>>) -> Res<Json<FetchSummary>> {
    let user = state.require_current_user().await?;
    let summary = state.pipeline.run_fetch_cycle(&user.user_id).await?;
    Ok(Json(summary))
}
