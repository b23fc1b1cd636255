//! Object storage backend
//!
//! Object storage has no real directories. A path counts as a directory when
//! at least one object key lives under `path/`, and the children of a
//! directory are the common prefixes and keys of a delimited listing.

use std::collections::BTreeSet;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::trace;

use common::error::Result;
use common::utils::{ensure_suffix, is_hidden};

use crate::backend::{BackendKind, StorageBackend};
use crate::s3path::{join_s3_path, s3_path, split_s3_path};

/// Default cap on keys returned by a single children listing
pub const DEFAULT_MAX_KEYS: usize = 1000;

/// Result of listing a bucket by prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    /// Prefixes rolled up at the delimiter, each ending with it
    pub common_prefixes: Vec<String>,
    /// Object keys directly matched
    pub keys: Vec<String>,
}

/// Minimal object storage client
///
/// Implementations handle authentication and network retries themselves.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Lists keys starting with `prefix`, rolling up at `delimiter` when given
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_keys: usize,
    ) -> Result<ObjectListing>;

    /// Returns true if an object exists at exactly `key`
    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool>;
}

/// Storage backend over an object storage client
#[derive(Clone)]
pub struct RemoteBackend {
    /// Object storage client
    client: Arc<dyn ObjectStoreClient>,
    
    /// Cap on keys per children listing
    max_keys: usize,
}

impl RemoteBackend {
    /// Creates a new remote backend
    pub fn new(client: Arc<dyn ObjectStoreClient>) -> Self {
        Self {
            client,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }

    /// Sets the cap on keys per children listing
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys.max(1);
        self
    }

    /// Returns the cap on keys per children listing
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    fn dir_prefix(key: &str) -> String {
        if key.is_empty() {
            String::new()
        } else {
            ensure_suffix(key, "/")
        }
    }
}

#[async_trait]
impl StorageBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn join(&self, base: &str, child: &str) -> String {
        join_s3_path(base, child)
    }

    async fn list_children(&self, path: &str) -> Result<Vec<String>> {
        let (bucket, key) = split_s3_path(path)?;
        let prefix = Self::dir_prefix(&key);

        let listing = self
            .client
            .list_objects(&bucket, &prefix, Some("/"), self.max_keys)
            .await?;

        let mut children = BTreeSet::new();
        for common_prefix in &listing.common_prefixes {
            children.insert(common_prefix.trim_end_matches('/').to_string());
        }
        for object_key in &listing.keys {
            // Skip the zero-byte directory marker some tools write
            if *object_key != prefix {
                children.insert(object_key.clone());
            }
        }

        trace!("Listed {} children under {}", children.len(), path);

        Ok(children.into_iter().map(|child| s3_path(&bucket, &child)).collect())
    }

    async fn list_descendants(&self, path: &str, include_hidden: bool) -> Result<Vec<String>> {
        let (bucket, key) = split_s3_path(path)?;
        let prefix = Self::dir_prefix(&key);

        let listing = self
            .client
            .list_objects(&bucket, &prefix, None, usize::MAX)
            .await?;

        let descendants = listing
            .keys
            .iter()
            .filter_map(|object_key| object_key.strip_prefix(prefix.as_str()))
            .filter(|relative| !relative.is_empty() && !relative.ends_with('/'))
            .filter(|relative| include_hidden || !relative.split('/').any(is_hidden))
            .map(str::to_string)
            .collect();

        Ok(descendants)
    }

    async fn is_directory(&self, path: &str) -> Result<bool> {
        let (bucket, key) = split_s3_path(path)?;
        let prefix = Self::dir_prefix(&key);

        let listing = self.client.list_objects(&bucket, &prefix, None, 1).await?;
        Ok(!listing.keys.is_empty())
    }

    async fn is_file(&self, paths: &[&str]) -> Result<bool> {
        for path in paths {
            let (bucket, key) = split_s3_path(path)?;
            if key.is_empty() || key.ends_with('/') {
                return Ok(false);
            }
            if !self.client.head_object(&bucket, &key).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn is_prefix_of_any(&self, prefix: &str) -> Result<bool> {
        let (bucket, key) = split_s3_path(prefix)?;

        let listing = self.client.list_objects(&bucket, &key, None, 1).await?;
        Ok(!listing.keys.is_empty())
    }
}
