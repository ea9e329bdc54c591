#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use tunetrail::{
    Error, Res,
    config::SpotifyConfig,
    management::{SessionManager, UserIdentity},
    pipeline::FetchPipeline,
    spotify::TopArtistsProvider,
    store::Store,
    types::{ArtistRecord, Followers, Token},
};

/// Provider that replays a fixed script of responses, one per call.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Res<Vec<ArtistRecord>>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Res<Vec<ArtistRecord>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, response: Res<Vec<ArtistRecord>>) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopArtistsProvider for ScriptedProvider {
    async fn fetch_top_artists(&self, _access_token: &str) -> Res<Vec<ArtistRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Network("script exhausted".into())))
    }
}

pub fn artist(id: &str, popularity: u32, genres: &[&str]) -> ArtistRecord {
    ArtistRecord {
        id: id.to_string(),
        name: format!("Artist {}", id),
        popularity,
        followers: Followers { total: 1000 },
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub fn fresh_token(access_token: &str) -> Token {
    Token {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh".to_string()),
        scope: "user-top-read".to_string(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

pub async fn memory_store() -> Store {
    Store::open("sqlite::memory:").await.unwrap()
}

pub async fn login(sessions: &SessionManager, user_id: &str) {
    sessions
        .register(
            UserIdentity {
                user_id: user_id.to_string(),
                display_name: format!("User {}", user_id),
            },
            fresh_token("tok"),
        )
        .await;
}

/// Pipeline over an in-memory store and the given provider. No user is logged in.
pub async fn pipeline_with(provider: Arc<ScriptedProvider>) -> Arc<FetchPipeline> {
    let sessions = Arc::new(SessionManager::without_refresh());
    Arc::new(FetchPipeline::new(provider, memory_store().await, sessions))
}

/// Serves `app` on an ephemeral local port and returns its base url.
pub async fn spawn_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn spotify_config(base_url: &str) -> SpotifyConfig {
    SpotifyConfig {
        client_id: "client-id".to_string(),
        client_secret: None,
        redirect_uri: "http://127.0.0.1:8080/callback".to_string(),
        scope: "user-top-read user-read-private".to_string(),
        auth_url: format!("{}/authorize", base_url),
        token_url: format!("{}/api/token", base_url),
        api_url: format!("{}/v1", base_url),
        top_artists_limit: 20,
        time_range: "medium_term".to_string(),
    }
}

pub const TIMEOUT: Duration = Duration::from_secs(5);
