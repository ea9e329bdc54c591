//! Personal Spotify listening-history tracker.
//!
//! tunetrail logs a user in against Spotify, polls their top artists on a
//! fixed interval, keeps the ranked results and genre tags in SQLite, and
//! serves a small HTTP surface for on-demand fetches and genre reports.
//!
//! # Modules
//!
//! - `api` - HTTP handlers (login, callback, fetch, reports, health)
//! - `cli` - Offline report commands reading the local store
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Error taxonomy and HTTP mapping
//! - `logging` - tracing subscriber setup
//! - `management` - In-memory session and token management
//! - `pipeline` - The fetch cycle: provider call, ranking, upsert, summary
//! - `scheduler` - Cancellable periodic driver of the fetch cycle
//! - `server` - Router assembly and HTTP serving
//! - `spotify` - Spotify Web API and OAuth client
//! - `store` - SQLite persistence gateway
//! - `types` - Data structures shared across modules
//! - `utils` - PKCE helpers, ranking and genre aggregation
//!
//! # Example
//!
//! ```
//! use tunetrail::{config, store::Store};
//!
//! #[tokio::main]
//! async fn main() -> tunetrail::Res<()> {
//!     config::load_env().await?;
//!     let cfg = config::Config::from_env()?;
//!     let store = Store::open(&cfg.database_url).await?;
//!     println!("{} artists stored", store.list_stored_artists().await?.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod pipeline;
pub mod scheduler;
pub mod server;
pub mod spotify;
pub mod store;
pub mod types;
pub mod utils;

pub use error::Error;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate returns [`Error`], so callers can
/// tell a dead token from a flaky network or a failed transaction.
///
/// # Example
///
/// ```
/// use tunetrail::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational line with a blue bullet point.
///
/// Console feedback for interactive commands; service diagnostics go through
/// `tracing` instead.
///
/// ```
/// info!("Open the login page to connect your account...");
/// info!("Found {} artists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
///
/// ```
/// success!("Server listening on {}", addr);
/// success!("Stored {} artists", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line with a red exclamation mark to stderr and exits.
///
/// Only for startup failures in the binary, where there is nothing left to
/// recover. Library code returns [`Error`] instead.
///
/// ```
/// error!("Failed to load configuration");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line with a yellow exclamation mark to stderr.
///
/// ```
/// warning!("No artists stored yet, run a fetch first");
/// warning!("Report window is {} days", days);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
