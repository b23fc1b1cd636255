//! Typed resolver settings

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Default cap on keys when listing the versions of a remote model
pub const DEFAULT_VERSION_LISTING_MAX_KEYS: usize = 1000;

/// Default cap on keys when discovering models in a remote directory
pub const DEFAULT_DISCOVERY_MAX_KEYS: usize = 20000;

/// Settings that drive model resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Directory relative model paths are resolved against
    pub project_dir: PathBuf,

    /// Cap on keys when listing the versions of a remote model
    pub version_listing_max_keys: usize,

    /// Cap on keys when discovering models in a remote directory
    pub discovery_max_keys: usize,

    /// Whether Python and ONNX models may skip version directories
    pub allow_unversioned: bool,

    /// Region for the object storage client
    #[serde(default)]
    pub s3_region: Option<String>,

    /// Rolling update settings handed through to the orchestration layer
    pub update_strategy: UpdateStrategy,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            version_listing_max_keys: DEFAULT_VERSION_LISTING_MAX_KEYS,
            discovery_max_keys: DEFAULT_DISCOVERY_MAX_KEYS,
            allow_unversioned: true,
            s3_region: None,
            update_strategy: UpdateStrategy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Rolling update settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStrategy {
    /// Extra replicas allowed during an update (count or percentage)
    pub max_surge: String,
    /// Replicas allowed to be unavailable during an update (count or percentage)
    pub max_unavailable: String,
}

impl Default for UpdateStrategy {
    fn default() -> Self {
        Self {
            max_surge: "25%".to_string(),
            max_unavailable: "25%".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
