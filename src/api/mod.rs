//! # API Module
//!
//! HTTP endpoints of the tunetrail server.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - starts the Spotify OAuth 2.0 PKCE flow and redirects the
//!   browser to the authorize page
//! - [`callback`] - completes the flow: validates `state`, exchanges the code,
//!   looks up the user's profile and registers their session
//!
//! ### Fetching
//!
//! - [`top_artists`] - runs a fetch cycle for the current user and returns
//!   the ranked artists with their genre summary
//!
//! ### Reports
//!
//! - [`analyze`] - genre counts over the configured report window
//! - [`fetch_data`] - everything stored: artists and genre membership counts
//! - [`ranks`] - the current user's stored ranks
//!
//! ### Monitoring
//!
//! - [`health`] - application status and version
//!
//! Handlers receive the shared [`AppState`] through an `Extension` layer and
//! return [`crate::Res`]; errors render as `{"error": "..."}` with the status
//! chosen by [`crate::Error::status_code`].

mod auth;
mod fetch;
mod health;
mod reports;

use std::{sync::Arc, time::Duration};

use crate::{
    Error, Res,
    management::{SessionManager, UserIdentity},
    pipeline::FetchPipeline,
    spotify::{OAuthClient, SpotifyClient},
    store::Store,
};

pub use auth::{callback, login};
pub use fetch::top_artists;
pub use health::health;
pub use reports::{analyze, fetch_data, ranks};

/// Everything a handler may need, built once in `main`.
pub struct AppState {
    pub oauth: OAuthClient,
    pub spotify: SpotifyClient,
    pub pipeline: Arc<FetchPipeline>,
    pub report_window: Duration,
}

impl AppState {
    pub fn sessions(&self) -> &SessionManager {
        self.pipeline.sessions()
    }

    pub fn store(&self) -> &Store {
        self.pipeline.store()
    }

    async fn require_current_user(&self) -> Res<UserIdentity> {
        self.sessions()
            .current_user()
            .await
            .ok_or_else(|| Error::Unauthenticated("no user has logged in yet, visit /login".into()))
    }
}
