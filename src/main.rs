use std::time::Duration;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use tunetrail::{cli, config, error, logging};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server and the periodic fetch
    Serve(ServeOptions),

    /// List stored artists
    Artists(ArtistsOptions),

    /// Genre counts over recently observed artists
    Genres(GenresOptions),

    /// Stored ranks of a user
    Ranks(RanksOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Seconds between two scheduled fetches (overrides TUNETRAIL_FETCH_INTERVAL_SECS)
    #[clap(long)]
    pub interval: Option<u64>,

    /// Open the login page in the default browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ArtistsOptions {
    /// Search for artists
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct GenresOptions {
    /// Size of the window in days (defaults to TUNETRAIL_REPORT_WINDOW_DAYS)
    #[clap(long)]
    pub days: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct RanksOptions {
    /// Spotify user id
    #[clap(long)]
    pub user: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let mut cfg = match config::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    if let Err(e) = logging::init_logging(&cfg.log_filter) {
        error!("Cannot initialise logging. Err: {}", e);
    }

    match cli.command {
        Command::Serve(opt) => {
            if let Some(secs) = opt.interval {
                if secs == 0 {
                    error!("--interval must be greater than zero");
                }
                cfg.fetch_interval = Duration::from_secs(secs);
            }
            cli::serve(&cfg, opt.open).await
        }
        Command::Artists(opt) => cli::list_artists(&cfg, opt.search).await,
        Command::Genres(opt) => cli::list_genres(&cfg, opt.days).await,
        Command::Ranks(opt) => cli::list_ranks(&cfg, &opt.user).await,
        Command::Completions(_) => {}
    }
}
