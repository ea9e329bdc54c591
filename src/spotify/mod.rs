//! # Spotify Integration Module
//!
//! This module is the only place tunetrail talks to Spotify. It covers two
//! services:
//!
//! ```text
//! Pipeline / HTTP handlers
//!          ↓
//! Spotify Integration Layer
//!     ├── OAuth (authorize URL, code exchange, refresh)   -> accounts.spotify.com
//!     └── Web API (top artists, current user profile)     -> api.spotify.com
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Provider seam
//!
//! The fetch pipeline does not depend on [`SpotifyClient`] directly but on the
//! [`TopArtistsProvider`] trait, so tests and alternative providers can stand
//! in for the real API.
//!
//! ## Error mapping
//!
//! Every Web API call maps failures the same way:
//! - `401 Unauthorized` / `403 Forbidden` become [`Error::Auth`]
//! - any other non-success status becomes [`Error::Network`]
//! - transport failures and timeouts become [`Error::Network`]
//! - a body that does not decode becomes [`Error::Parse`]
//!
//! Nothing is retried here. Whether and when to try again is the caller's
//! decision (the scheduler simply waits for its next tick).
//!
//! ## API Coverage
//!
//! - `GET /me/top/artists` - the user's top artists, most listened first
//! - `GET /me` - the user's id and display name
//! - `POST /api/token` - authorization code exchange and token refresh

pub mod artists;
pub mod auth;
pub mod user;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{Error, Res, config::SpotifyConfig, types::ArtistRecord};

pub use auth::OAuthClient;

/// Source of a user's top artists, in listening order.
#[async_trait]
pub trait TopArtistsProvider: Send + Sync {
    async fn fetch_top_artists(&self, access_token: &str) -> Res<Vec<ArtistRecord>>;
}

/// Client for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    limit: u32,
    time_range: String,
}

impl SpotifyClient {
    pub fn new(cfg: &SpotifyConfig, timeout: Duration) -> Res<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            limit: cfg.top_artists_limit,
            time_range: cfg.time_range.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

pub(crate) fn http_client(timeout: Duration) -> Res<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| Error::Network(format!("build client: {e}")))
}

/// Checks the status of a Web API response and decodes its JSON body.
pub(crate) async fn decode_response<T: DeserializeOwned>(response: Response) -> Res<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let detail = String::from_utf8_lossy(&body);
        let detail = detail.chars().take(200).collect::<String>();
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Auth(format!("spotify returned {status}: {detail}"))
            }
            _ => Error::Network(format!("spotify returned {status}: {detail}")),
        });
    }

    tracing::trace!(body = %String::from_utf8_lossy(&body), "spotify.response");
    Ok(serde_json::from_slice(&body)?)
}
