//! Object storage URI helpers

use common::error::{Error, Result};

/// URI scheme prefix for object storage paths
pub const S3_SCHEME: &str = "s3://";

/// Returns true if the path uses the object storage scheme
pub fn is_s3_uri(path: &str) -> bool {
    path.starts_with(S3_SCHEME)
}

/// Returns true if the path is an object storage URI with a non-empty bucket
pub fn is_valid_s3_path(path: &str) -> bool {
    split_s3_path(path).is_ok()
}

/// Splits `s3://bucket/key` into `(bucket, key)`
///
/// The key keeps any trailing separator and may be empty.
pub fn split_s3_path(path: &str) -> Result<(String, String)> {
    let rest = path
        .strip_prefix(S3_SCHEME)
        .ok_or_else(|| Error::InvalidS3Path(path.to_string()))?;

    let (bucket, key) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest, ""),
    };

    if bucket.is_empty() {
        return Err(Error::InvalidS3Path(path.to_string()));
    }

    Ok((bucket.to_string(), key.to_string()))
}

/// Builds `s3://bucket/key`
pub fn s3_path(bucket: &str, key: &str) -> String {
    format!("{}{}/{}", S3_SCHEME, bucket, key.trim_start_matches('/'))
}

/// Joins a child onto an object storage path with exactly one separator
pub fn join_s3_path(base: &str, child: &str) -> String {
    let child = child.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{}{}", base, child)
    } else {
        format!("{}/{}", base, child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_s3_path() {
        assert_eq!(
            split_s3_path("s3://bucket/models/mnist/").unwrap(),
            ("bucket".to_string(), "models/mnist/".to_string())
        );
        assert_eq!(
            split_s3_path("s3://bucket").unwrap(),
            ("bucket".to_string(), String::new())
        );
        assert!(matches!(split_s3_path("s3:///key"), Err(Error::InvalidS3Path(_))));
        assert!(matches!(split_s3_path("/local/path"), Err(Error::InvalidS3Path(_))));
    }

    #[test]
    fn test_is_s3_uri() {
        assert!(is_s3_uri("s3://bucket/model"));
        assert!(!is_s3_uri("gs://bucket/model"));
        assert!(!is_s3_uri("models/s3://"));
        assert!(!is_valid_s3_path("s3://"));
    }

    #[test]
    fn test_join_s3_path() {
        assert_eq!(join_s3_path("s3://b/m/", "1"), "s3://b/m/1");
        assert_eq!(join_s3_path("s3://b/m", "1"), "s3://b/m/1");
        assert_eq!(join_s3_path("s3://b/m/", "/saved_model.pb"), "s3://b/m/saved_model.pb");
        assert_eq!(s3_path("b", "m/1"), "s3://b/m/1");
    }
}
