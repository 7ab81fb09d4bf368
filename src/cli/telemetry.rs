//! Tracing setup for the CLI and server.
//!
//! Output is human-readable by default; set `COMPITI_LOG_FORMAT=json` for
//! structured JSON lines in production deployments.

use anyhow::Result;
use std::env::var;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// The verbosity flag wins; without it `RUST_LOG` is honored and the default
/// is `error`.
///
/// # Errors
///
/// Returns an error if a subscriber has already been installed.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = match verbosity_level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
    };

    let json_output = var("COMPITI_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()?;
    }

    Ok(())
}
