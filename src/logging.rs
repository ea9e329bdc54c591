use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{Error, Res};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter so a single run can be made
/// more verbose without touching `.env`.
pub fn init_logging(default_filter: &str) -> Res<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(default_filter),
    }
    .map_err(|e| Error::Config(format!("invalid log filter: {e}")))?;

    let fmt_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialised: {e}")))
}
