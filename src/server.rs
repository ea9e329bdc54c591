use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio_util::sync::CancellationToken;

use crate::{Res, api};

pub fn router(state: Arc<api::AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/top-artists", get(api::top_artists))
        .route("/analyze", get(api::analyze))
        .route("/fetch-data", get(api::fetch_data))
        .route("/ranks", get(api::ranks))
        .layer(Extension(state))
}

/// Serves the API on `addr` until `shutdown` is cancelled.
pub async fn start_api_server(
    addr: SocketAddr,
    state: Arc<api::AppState>,
    shutdown: CancellationToken,
) -> Res<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server.listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("server.stopped");
    Ok(())
}
