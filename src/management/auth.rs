use chrono::Utc;

use crate::{Error, Res, types::Token};

/// Seconds before the real expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Holds one user's OAuth token in memory and tracks its expiry.
///
/// Tokens never touch the disk; restarting the process means logging in again.
#[derive(Debug, Clone)]
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    /// The refresh token to trade for a new access token.
    pub fn refresh_token(&self) -> Res<String> {
        self.token.refresh_token.clone().ok_or_else(|| {
            Error::Auth("access token expired and no refresh token is available".into())
        })
    }

    /// Stores a token obtained with [`TokenManager::refresh_token`].
    ///
    /// Returns `false` and keeps the current token when it no longer carries
    /// `used_refresh_token`, i.e. the user logged in again meanwhile.
    pub fn replace_refreshed(&mut self, used_refresh_token: &str, token: Token) -> bool {
        if self.token.refresh_token.as_deref() != Some(used_refresh_token) {
            return false;
        }
        self.token = token;
        true
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp().max(0) as u64)
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        let expires_at = self.token.obtained_at + self.token.expires_in;
        now >= expires_at.saturating_sub(EXPIRY_MARGIN_SECS)
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
