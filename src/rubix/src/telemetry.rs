//! Tracing subscriber setup

use crate::config::LoggingSection;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. Returns `false` when a global
/// subscriber was already installed, leaving it in place.
pub fn init_tracing(config: &LoggingSection) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    Ok(installed.is_ok())
}
