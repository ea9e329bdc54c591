//! # CLI Module
//!
//! User-facing commands of the `tunetrail` binary.
//!
//! ## Commands
//!
//! - [`serve`] - runs the HTTP server and the background scheduler until
//!   Ctrl-C; logging in through `/login` is what gives the scheduler a user
//!   to fetch for
//! - [`list_artists`] - stored artists, optionally filtered by name
//! - [`list_genres`] - genre counts over a window of days
//! - [`list_ranks`] - a user's stored ranks
//!
//! Report commands only read the local SQLite store; they never talk to
//! Spotify, so they work while the server is down.
//!
//! ## Usage Patterns
//!
//! ```bash
//! tunetrail serve --open              # start and log in through the browser
//! tunetrail serve --interval 900      # fetch every 15 minutes
//! tunetrail genres --days 30          # genres of the last month
//! tunetrail artists --search radio    # find stored artists
//! tunetrail ranks --user <spotify id>
//! ```
//!
//! Failures are printed with the colored console macros; fatal ones exit
//! with status 1.

mod artists;
mod reports;
mod serve;

pub use artists::list_artists;
pub use reports::list_genres;
pub use reports::list_ranks;
pub use serve::serve;

use crate::{config::Config, error, store::Store};

async fn open_store(cfg: &Config) -> Store {
    match Store::open(&cfg.database_url).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open store at {}. Err: {}", cfg.database_url, e),
    }
}
