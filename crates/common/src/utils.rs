//! Utility functions for the model resolver
//!
//! This module provides the string and version helpers shared by the storage
//! backends and the layout validators.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::types::Version;

/// Parses a version directory name
///
/// Only plain base-10 digits are accepted; signs, whitespace and anything
/// else are rejected. Leading zeros parse to the numeric value.
///
/// # Examples
///
/// ```
/// use common::utils::parse_version;
///
/// assert_eq!(parse_version("1600000000"), Some(1600000000));
/// assert_eq!(parse_version("007"), Some(7));
/// assert_eq!(parse_version("+1"), None);
/// ```
pub fn parse_version(name: &str) -> Option<Version> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<Version>().ok()
}

/// Removes duplicate versions
///
/// The result is sorted ascending, so it does not depend on input order.
///
/// # Examples
///
/// ```
/// use common::utils::unique_versions;
///
/// assert_eq!(unique_versions(vec![3, 1, 3, 2]), vec![1, 2, 3]);
/// ```
pub fn unique_versions<I>(versions: I) -> Vec<Version>
where
    I: IntoIterator<Item = Version>,
{
    versions.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Appends `suffix` unless `s` already ends with it
///
/// # Examples
///
/// ```
/// use common::utils::ensure_suffix;
///
/// assert_eq!(ensure_suffix("/data/model", "/"), "/data/model/");
/// assert_eq!(ensure_suffix("/data/model/", "/"), "/data/model/");
/// ```
pub fn ensure_suffix(s: &str, suffix: &str) -> String {
    if s.ends_with(suffix) {
        s.to_string()
    } else {
        format!("{}{}", s, suffix)
    }
}

/// Returns the last `/`-separated component of a path, ignoring trailing separators
///
/// # Examples
///
/// ```
/// use common::utils::base_name;
///
/// assert_eq!(base_name("s3://bucket/models/mnist/"), "mnist");
/// assert_eq!(base_name("/data/model.onnx"), "model.onnx");
/// ```
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Returns true for dotfiles and dot-directories
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Formats a duration into a human-readable string
///
/// # Examples
///
/// ```
/// use common::utils::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    
    if total_secs == 0 {
        return format!("{}ms", duration.subsec_millis());
    }
    
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Executes a future with a timeout
///
/// The resolver itself never imposes a deadline; callers that need one wrap
/// a resolution call with this.
pub async fn execute_with_timeout<T, F>(
    future: F,
    duration: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(format!("Operation '{}' timed out after {}", 
                                            operation_name, 
                                            format_duration(duration)))),
    }
}

/// Measures the execution time of an async function
pub async fn measure_execution_time_async<T, F>(future: F) -> Result<(T, Duration)>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = future.await?;
    let duration = start.elapsed();
    Ok((result, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_accepts_digits_only() {
        assert_eq!(parse_version("0"), Some(0));
        assert_eq!(parse_version("1600000000"), Some(1_600_000_000));
        assert_eq!(parse_version("00042"), Some(42));
        assert_eq!(parse_version(&u64::MAX.to_string()), Some(u64::MAX));

        for invalid in ["", "+1", "-1", "1.0", "v1", " 1", "1 ", "latest", "1e3"] {
            assert_eq!(parse_version(invalid), None, "{:?} should be rejected", invalid);
        }
    }

    #[test]
    fn test_parse_version_rejects_overflow() {
        assert_eq!(parse_version("18446744073709551616"), None);
    }

    #[test]
    fn test_unique_versions_is_idempotent_and_order_independent() {
        let once = unique_versions(vec![5, 1, 5, 3, 1]);
        assert_eq!(once, vec![1, 3, 5]);
        assert_eq!(unique_versions(once.clone()), once);
        assert_eq!(unique_versions(vec![1, 3, 5, 5, 1]), once);
        assert!(unique_versions(Vec::new()).is_empty());
    }

    #[test]
    fn test_ensure_suffix_is_idempotent() {
        let once = ensure_suffix("s3://bucket/model", "/");
        assert_eq!(once, "s3://bucket/model/");
        assert_eq!(ensure_suffix(&once, "/"), once);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("s3://bucket/a/b"), "b");
        assert_eq!(base_name("/a/b//"), "b");
        assert_eq!(base_name("model"), "model");
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(".DS_Store"));
        assert!(!is_hidden("saved_model.pb"));
    }

    #[tokio::test]
    async fn test_execute_with_timeout() {
        let value = execute_with_timeout(async { Ok(42) }, Duration::from_secs(1), "answer")
            .await
            .unwrap();
        assert_eq!(value, 42);

        let err = execute_with_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            Duration::from_millis(10),
            "slow listing",
        )
        .await
        .unwrap_err();
        assert!(err.is_timeout());
    }
}
