use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;

use crate::{
    Error, Res,
    management::TokenManager,
    spotify::OAuthClient,
    types::{PkceLogin, Token},
};

/// Logins started but never completed are dropped, oldest first, past this many.
const MAX_PENDING_LOGINS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug)]
struct Session {
    identity: UserIdentity,
    tokens: TokenManager,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    current: Option<String>,
    pending: HashMap<String, String>,
    /// States of `pending` in the order their logins started.
    pending_order: VecDeque<String>,
}

/// In-memory registry of authenticated users and their tokens.
///
/// Every lookup is keyed on an explicit user id. The most recently
/// authenticated user is also remembered as the "current" user, which is who
/// the scheduler and the on-demand endpoints fetch for.
#[derive(Debug)]
pub struct SessionManager {
    oauth: Option<OAuthClient>,
    inner: Mutex<Inner>,
}

impl SessionManager {
    pub fn new(oauth: OAuthClient) -> Self {
        Self {
            oauth: Some(oauth),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A registry that can hand out tokens but never refresh them.
    pub fn without_refresh() -> Self {
        Self {
            oauth: None,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Remembers a started login until its callback arrives.
    pub async fn remember_login(&self, login: PkceLogin) {
        let mut inner = self.inner.lock().await;
        while inner.pending.len() >= MAX_PENDING_LOGINS {
            let Some(oldest) = inner.pending_order.pop_front() else {
                break;
            };
            if inner.pending.remove(&oldest).is_some() {
                tracing::warn!("login.pending.evicted");
            }
        }
        inner.pending_order.push_back(login.state.clone());
        inner.pending.insert(login.state, login.code_verifier);
    }

    /// Takes the code verifier for a callback's `state`. Each state can be
    /// redeemed once.
    pub async fn take_verifier(&self, state: &str) -> Option<String> {
        let mut inner = self.inner.lock().await;
        let verifier = inner.pending.remove(state)?;
        inner.pending_order.retain(|s| s != state);
        Some(verifier)
    }

    /// Registers (or replaces) a user's session and makes them current.
    pub async fn register(&self, identity: UserIdentity, token: Token) {
        let mut inner = self.inner.lock().await;
        let user_id = identity.user_id.clone();
        inner.sessions.insert(
            user_id.clone(),
            Session {
                identity,
                tokens: TokenManager::new(token),
            },
        );
        inner.current = Some(user_id);
    }

    pub async fn current_user(&self) -> Option<UserIdentity> {
        let inner = self.inner.lock().await;
        inner
            .current
            .as_ref()
            .and_then(|id| inner.sessions.get(id))
            .map(|s| s.identity.clone())
    }

    /// Returns a valid access token for `user_id`, refreshing it if it is
    /// about to expire.
    ///
    /// The registry is not locked while the refresh request is in flight.
    pub async fn access_token(&self, user_id: &str) -> Res<String> {
        let refresh_token = {
            let inner = self.inner.lock().await;
            let session = inner
                .sessions
                .get(user_id)
                .ok_or_else(|| Error::Unauthenticated(format!("no session for user {user_id}")))?;

            if !session.tokens.is_expired() {
                return Ok(session.tokens.current_token().access_token.clone());
            }
            session.tokens.refresh_token()
        };

        let Some(oauth) = &self.oauth else {
            return Err(Error::Auth(format!("token for user {user_id} has expired")));
        };
        let refresh_token = refresh_token?;
        let token = oauth.refresh_token(&refresh_token).await?;
        let access_token = token.access_token.clone();
        tracing::info!(user_id, expires_in = token.expires_in, "token.refreshed");

        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.sessions.get_mut(user_id)
            && !session.tokens.replace_refreshed(&refresh_token, token)
        {
            tracing::debug!(user_id, "token.refresh.superseded");
        }
        Ok(access_token)
    }
}
