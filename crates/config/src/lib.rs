//! Configuration management for the model resolver
//!
//! This crate layers built-in defaults, an optional configuration file and
//! `MODEL_RESOLVER_*` environment variables into typed resolver settings.

pub mod manager;
pub mod settings;
pub mod validation;

// Re-export commonly used types
pub use manager::ConfigManager;
pub use settings::{LoggingConfig, ResolverSettings, UpdateStrategy};
pub use validation::{validate_surge_or_unavailable, ConfigValidator};
