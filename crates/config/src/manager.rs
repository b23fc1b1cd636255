//! Configuration manager
//!
//! Layers, lowest precedence first: built-in defaults, an optional
//! configuration file (TOML, YAML or JSON by extension) and environment
//! variables prefixed with `MODEL_RESOLVER_`. Nested keys use `__`, so
//! `MODEL_RESOLVER_LOGGING__JSON=true` sets `logging.json`.

use std::path::Path;
use config_rs::{Config, ConfigError, Environment, File};
use tracing::debug;

use common::error::{Error, Result};

use crate::settings::{
    ResolverSettings, DEFAULT_DISCOVERY_MAX_KEYS, DEFAULT_VERSION_LISTING_MAX_KEYS,
};
use crate::validation::ConfigValidator;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MODEL_RESOLVER";

fn config_error(e: ConfigError) -> Error {
    Error::Config(e.to_string())
}

/// Configuration manager
#[derive(Debug)]
pub struct ConfigManager {
    /// Typed view of the merged layers
    settings: ResolverSettings,
}

impl ConfigManager {
    /// Creates a configuration manager from defaults and the environment
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Creates a configuration manager that also reads a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("project_dir", ".")
            .and_then(|b| b.set_default("version_listing_max_keys", DEFAULT_VERSION_LISTING_MAX_KEYS as i64))
            .and_then(|b| b.set_default("discovery_max_keys", DEFAULT_DISCOVERY_MAX_KEYS as i64))
            .and_then(|b| b.set_default("allow_unversioned", true))
            .and_then(|b| b.set_default("update_strategy.max_surge", "25%"))
            .and_then(|b| b.set_default("update_strategy.max_unavailable", "25%"))
            .and_then(|b| b.set_default("logging.level", "info"))
            .and_then(|b| b.set_default("logging.json", false))
            .map_err(config_error)?;

        if let Some(path) = file {
            debug!("Loading configuration file {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: ResolverSettings = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)?;

        ConfigValidator::validate(&settings)?;

        Ok(Self { settings })
    }

    /// Returns the typed resolver settings
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }
}
