use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};

use crate::{
    Error, Res,
    config::SpotifyConfig,
    spotify::http_client,
    types::{PkceLogin, Token, TokenResponse},
    utils,
};

/// OAuth 2.0 authorization-code client for the Spotify accounts service.
///
/// Uses PKCE (Proof Key for Code Exchange): `/login` generates a code
/// verifier, sends its SHA256 challenge with the authorize request, and the
/// callback proves possession of the verifier when exchanging the code. A
/// client secret is added to token requests only when one is configured.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    cfg: SpotifyConfig,
}

impl OAuthClient {
    pub fn new(cfg: &SpotifyConfig, timeout: Duration) -> Res<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            cfg: cfg.clone(),
        })
    }

    /// Starts a login: fresh verifier and state, plus the URL to send the
    /// user's browser to.
    ///
    /// # Authentication Flow
    ///
    /// 1. **PKCE Setup**: random 128 character verifier, S256 challenge
    /// 2. **Authorization Request**: user is redirected to Spotify with the challenge
    /// 3. **Callback**: Spotify redirects back with `code` and the same `state`
    /// 4. **Token Exchange**: [`OAuthClient::exchange_code_pkce`] trades code + verifier for a token
    pub fn begin_login(&self) -> Res<(PkceLogin, String)> {
        let login = PkceLogin {
            state: utils::generate_state(),
            code_verifier: utils::generate_code_verifier(),
        };
        let url = self.authorize_url(&login)?;
        Ok((login, url))
    }

    pub fn authorize_url(&self, login: &PkceLogin) -> Res<String> {
        let challenge = utils::generate_code_challenge(&login.code_verifier);
        let url = Url::parse_with_params(
            &self.cfg.auth_url,
            &[
                ("client_id", self.cfg.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.cfg.redirect_uri.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", challenge.as_str()),
                ("scope", self.cfg.scope.as_str()),
                ("state", login.state.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("SPOTIFY_API_AUTH_URL invalid: {e}")))?;

        Ok(url.into())
    }

    /// Exchanges an authorization code for an access token using PKCE.
    ///
    /// The authorization code is single-use and expires quickly, so this is
    /// called straight from the callback handler.
    pub async fn exchange_code_pkce(&self, code: &str, verifier: &str) -> Res<Token> {
        let form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", self.cfg.redirect_uri.as_str()),
        ];
        let token = self.token_request(form).await?;
        if token.refresh_token.is_none() {
            tracing::warn!("token response carried no refresh token");
        }
        Ok(token)
    }

    /// Refreshes an expired access token using a refresh token.
    ///
    /// Spotify may or may not rotate the refresh token; when the response
    /// carries none the old one is kept.
    pub async fn refresh_token(&self, refresh_token: &str) -> Res<Token> {
        let form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let mut token = self.token_request(form).await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }

    async fn token_request<'a>(&'a self, mut form: Vec<(&'a str, &'a str)>) -> Res<Token> {
        form.push(("client_id", self.cfg.client_id.as_str()));
        if let Some(secret) = &self.cfg.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http
            .post(&self.cfg.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            // the token endpoint answers 400 for a bad code or a revoked refresh token
            return Err(Error::Auth(format!(
                "token endpoint returned {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        let json: TokenResponse = serde_json::from_slice(&body)?;
        Ok(Token {
            access_token: json.access_token,
            refresh_token: json.refresh_token,
            scope: json.scope,
            expires_in: json.expires_in,
            obtained_at: Utc::now().timestamp().max(0) as u64,
        })
    }
}
