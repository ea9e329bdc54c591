//! Configuration management for tunetrail.
//!
//! Values come from environment variables, optionally loaded from a `.env`
//! file in the platform-specific local data directory. They are parsed once
//! into a typed [`Config`] at startup so that a missing client id or a
//! malformed number is reported before the server binds, not on the first
//! request that needs it.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::{Error, Res};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const DEFAULT_SCOPE: &str = "user-top-read user-read-private";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REPORT_WINDOW_DAYS: u64 = 7;
pub const DEFAULT_TOP_ARTISTS_LIMIT: u32 = 20;
pub const DEFAULT_TIME_RANGE: &str = "medium_term";
pub const DEFAULT_LOG_FILTER: &str = "info";

const TIME_RANGES: [&str; 3] = ["short_term", "medium_term", "long_term"];

/// Returns the tunetrail directory inside the platform local data directory.
///
/// - Linux: `~/.local/share/tunetrail`
/// - macOS: `~/Library/Application Support/tunetrail`
/// - Windows: `%LOCALAPPDATA%/tunetrail`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tunetrail");
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the data directory if it doesn't exist. A missing `.env` file is
/// not an error: every value can also come straight from the environment.
/// A `.env` file that exists but cannot be parsed is reported.
///
/// # Example
///
/// ```
/// use tunetrail::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Res<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    }
    Ok(())
}

/// Settings for talking to Spotify: the OAuth endpoints and the Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    /// Only sent on token requests when present; PKCE works without it.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub top_artists_limit: u32,
    pub time_range: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub spotify: SpotifyConfig,
    pub database_url: String,
    pub fetch_interval: Duration,
    pub http_timeout: Duration,
    pub report_window: Duration,
    pub log_filter: String,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset and fall back to the defaults in this
    /// module. `SPOTIFY_API_AUTH_CLIENT_ID` has no default; it is checked by
    /// [`Config::require_spotify`].
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_addr = parse_value::<SocketAddr>(
            "SERVER_ADDRESS",
            get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
        )?;

        // checked by require_spotify; report commands never talk to Spotify
        let client_id = get("SPOTIFY_API_AUTH_CLIENT_ID").unwrap_or_default();

        let top_artists_limit = match get("TUNETRAIL_TOP_ARTISTS_LIMIT") {
            Some(v) => parse_value::<u32>("TUNETRAIL_TOP_ARTISTS_LIMIT", v)?,
            None => DEFAULT_TOP_ARTISTS_LIMIT,
        };
        if !(1..=50).contains(&top_artists_limit) {
            return Err(Error::Config(format!(
                "TUNETRAIL_TOP_ARTISTS_LIMIT must be between 1 and 50, got {top_artists_limit}"
            )));
        }

        let time_range = get("TUNETRAIL_TIME_RANGE").unwrap_or_else(|| DEFAULT_TIME_RANGE.into());
        if !TIME_RANGES.contains(&time_range.as_str()) {
            return Err(Error::Config(format!(
                "TUNETRAIL_TIME_RANGE must be one of {}, got {time_range}",
                TIME_RANGES.join(", ")
            )));
        }

        let spotify = SpotifyConfig {
            client_id,
            client_secret: get("SPOTIFY_API_AUTH_CLIENT_SECRET"),
            redirect_uri: get("SPOTIFY_API_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.into()),
            scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.into()),
            auth_url: get("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
            token_url: get("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
            api_url: trim_slash(get("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into())),
            top_artists_limit,
            time_range,
        };

        let database_url = get("TUNETRAIL_DATABASE_URL").unwrap_or_else(default_database_url);

        let fetch_interval = seconds(
            "TUNETRAIL_FETCH_INTERVAL_SECS",
            get("TUNETRAIL_FETCH_INTERVAL_SECS"),
            DEFAULT_FETCH_INTERVAL_SECS,
        )?;
        let http_timeout = seconds(
            "TUNETRAIL_HTTP_TIMEOUT_SECS",
            get("TUNETRAIL_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        let window_days = match get("TUNETRAIL_REPORT_WINDOW_DAYS") {
            Some(v) => parse_value::<u64>("TUNETRAIL_REPORT_WINDOW_DAYS", v)?,
            None => DEFAULT_REPORT_WINDOW_DAYS,
        };
        if window_days == 0 {
            return Err(Error::Config(
                "TUNETRAIL_REPORT_WINDOW_DAYS must be at least 1".into(),
            ));
        }

        let log_filter = get("TUNETRAIL_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into());

        Ok(Self {
            server_addr,
            spotify,
            database_url,
            fetch_interval,
            http_timeout,
            report_window: days(window_days).ok_or_else(|| {
                Error::Config(format!(
                    "TUNETRAIL_REPORT_WINDOW_DAYS is too large: {window_days}"
                ))
            })?,
            log_filter,
        })
    }

    /// The Spotify settings, provided a client id is configured.
    ///
    /// Only the server needs them, so a missing client id is reported here
    /// rather than by [`Config::from_lookup`].
    pub fn require_spotify(&self) -> Res<&SpotifyConfig> {
        if self.spotify.client_id.is_empty() {
            return Err(Error::Config("SPOTIFY_API_AUTH_CLIENT_ID was not set".into()));
        }
        Ok(&self.spotify)
    }
}

/// `n` days as a [`Duration`], or `None` when that many seconds overflow.
pub fn days(n: u64) -> Option<Duration> {
    n.checked_mul(24 * 60 * 60).map(Duration::from_secs)
}

fn default_database_url() -> String {
    format!("sqlite://{}", data_dir().join("tunetrail.db").display())
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_value<T>(key: &str, value: String) -> Res<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| Error::Config(format!("{key} is invalid ({value}): {e}")))
}

fn seconds(key: &str, value: Option<String>, default: u64) -> Res<Duration> {
    let secs = match value {
        Some(v) => parse_value::<u64>(key, v)?,
        None => default,
    };
    if secs == 0 {
        return Err(Error::Config(format!("{key} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}
