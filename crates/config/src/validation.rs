//! Validation of configuration values

use common::error::{Error, Result};

use crate::settings::{ResolverSettings, UpdateStrategy};

/// Validates a rolling update `max_surge` / `max_unavailable` value
///
/// Accepts a non-negative integer (`"3"`) or a percentage between 0 and 100
/// (`"25%"`). Returns the value unchanged on success.
pub fn validate_surge_or_unavailable(value: &str) -> Result<String> {
    let invalid = || Error::InvalidSurgeOrUnavailable(value.to_string());

    match value.strip_suffix('%') {
        Some(percentage) => {
            let parsed: i32 = percentage.parse().map_err(|_| invalid())?;
            if !(0..=100).contains(&parsed) {
                return Err(invalid());
            }
        }
        None => {
            let parsed: i32 = value.parse().map_err(|_| invalid())?;
            if parsed < 0 {
                return Err(invalid());
            }
        }
    }

    Ok(value.to_string())
}

fn is_zero(value: &str) -> bool {
    value.trim_end_matches('%').parse::<i32>().map(|v| v == 0).unwrap_or(false)
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates resolver settings
    pub fn validate(settings: &ResolverSettings) -> Result<()> {
        if settings.version_listing_max_keys == 0 {
            return Err(Error::Config("version_listing_max_keys must be greater than 0".to_string()));
        }

        if settings.discovery_max_keys == 0 {
            return Err(Error::Config("discovery_max_keys must be greater than 0".to_string()));
        }

        if settings.project_dir.as_os_str().is_empty() {
            return Err(Error::Config("project_dir must not be empty".to_string()));
        }

        Self::validate_update_strategy(&settings.update_strategy)
    }

    /// Validates a rolling update strategy
    pub fn validate_update_strategy(strategy: &UpdateStrategy) -> Result<()> {
        validate_surge_or_unavailable(&strategy.max_surge)?;
        validate_surge_or_unavailable(&strategy.max_unavailable)?;
        if is_zero(&strategy.max_surge) && is_zero(&strategy.max_unavailable) {
            return Err(Error::SurgeAndUnavailableBothZero);
        }

        Ok(())
    }
}
