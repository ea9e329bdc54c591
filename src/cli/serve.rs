use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    api::AppState,
    cli::open_store,
    config::Config,
    error, info,
    management::SessionManager,
    pipeline::FetchPipeline,
    scheduler::Scheduler,
    server::start_api_server,
    spotify::{OAuthClient, SpotifyClient},
    success, warning,
};

/// Runs the API server and the scheduler until Ctrl-C or until the server
/// fails.
pub async fn serve(cfg: &Config, open_browser: bool) {
    let spotify_cfg = match cfg.require_spotify() {
        Ok(spotify_cfg) => spotify_cfg,
        Err(e) => error!("Cannot serve without Spotify credentials. Err: {}", e),
    };
    let store = open_store(cfg).await;

    let oauth = match OAuthClient::new(spotify_cfg, cfg.http_timeout) {
        Ok(c) => c,
        Err(e) => error!("Cannot build OAuth client. Err: {}", e),
    };
    let spotify = match SpotifyClient::new(spotify_cfg, cfg.http_timeout) {
        Ok(c) => c,
        Err(e) => error!("Cannot build Spotify client. Err: {}", e),
    };

    let sessions = Arc::new(SessionManager::new(oauth.clone()));
    let pipeline = Arc::new(FetchPipeline::new(
        Arc::new(spotify.clone()),
        store,
        sessions,
    ));
    let state = Arc::new(AppState {
        oauth,
        spotify,
        pipeline: Arc::clone(&pipeline),
        report_window: cfg.report_window,
    });

    let shutdown = CancellationToken::new();
    let scheduler = Scheduler::new(pipeline, cfg.fetch_interval, shutdown.clone());
    let scheduler_task = tokio::spawn(scheduler.run());
    let mut server_task = tokio::spawn(start_api_server(cfg.server_addr, state, shutdown.clone()));

    success!("Serving on http://{}", cfg.server_addr);
    let login_url = format!("http://{}/login", cfg.server_addr);
    if open_browser {
        if webbrowser::open(&login_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                login_url
            )
        }
    } else {
        info!("Log in at {}", login_url);
    }

    // the server only returns early when it could not bind or crashed
    let finished = tokio::select! {
        _ = tokio::signal::ctrl_c() => None,
        res = &mut server_task => Some(res),
    };

    shutdown.cancel();
    let res = match finished {
        Some(res) => res,
        None => {
            info!("Shutting down...");
            server_task.await
        }
    };

    if let Err(e) = scheduler_task.await {
        warning!("Scheduler ended abnormally. Err: {}", e);
    }

    match res {
        Ok(Ok(())) => success!("Stopped."),
        Ok(Err(e)) => error!("Server failed. Err: {}", e),
        Err(e) => error!("Server task ended abnormally. Err: {}", e),
    }
}
