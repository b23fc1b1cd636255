//! Logging for the model resolver
//!
//! This crate installs the global `tracing` subscriber. `RUST_LOG` takes
//! precedence over the configured level.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use config::LoggingConfig;

/// Builds the filter from `RUST_LOG`, falling back to the configured level
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Initializes logging
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config);

    if config.json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .map_err(|e| anyhow!("failed to install JSON log subscriber: {}", e))
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
    }
}
