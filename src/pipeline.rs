//! The fetch cycle.
//!
//! ```text
//! session registry -> access token
//!        ↓
//! TopArtistsProvider::fetch_top_artists      (abort on failure, nothing written)
//!        ↓
//! rank_artists                               (1..=N, provider order)
//!        ↓
//! Store::upsert_cycle                        (one transaction)
//!        ↓
//! genre_frequency                            (pure)
//! ```
//!
//! The scheduler and the on-demand HTTP endpoints share one [`FetchPipeline`],
//! and its lock spans the whole cycle, so two cycles never interleave.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    Res,
    management::SessionManager,
    spotify::TopArtistsProvider,
    store::Store,
    types::FetchSummary,
    utils,
};

pub struct FetchPipeline {
    provider: Arc<dyn TopArtistsProvider>,
    store: Store,
    sessions: Arc<SessionManager>,
    lock: Mutex<()>,
}

impl FetchPipeline {
    pub fn new(
        provider: Arc<dyn TopArtistsProvider>,
        store: Store,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            provider,
            store,
            sessions,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Runs one fetch cycle for `user_id`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Unauthenticated`] when the user has no session
    /// - [`crate::Error::Auth`], [`crate::Error::Network`] or
    ///   [`crate::Error::Parse`] from the provider; nothing is written
    /// - [`crate::Error::Persistence`] when the transaction fails; it is
    ///   rolled back as a whole
    pub async fn run_fetch_cycle(&self, user_id: &str) -> Res<FetchSummary> {
        let _cycle = self.lock.lock().await;

        let token = self.sessions.access_token(user_id).await?;
        let fetched = self.provider.fetch_top_artists(&token).await.inspect_err(|e| {
            tracing::warn!(user_id, error = %e, "cycle.fetch.failed");
        })?;

        let ranked = utils::rank_artists(fetched);
        self.store.upsert_cycle(user_id, &ranked, Utc::now()).await?;

        let genres = utils::genre_frequency(&ranked);
        tracing::info!(
            user_id,
            artists = ranked.len(),
            genres = genres.len(),
            "cycle.completed"
        );

        Ok(FetchSummary {
            artists: ranked,
            genres,
        })
    }
}
