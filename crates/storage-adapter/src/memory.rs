//! In-memory object store
//!
//! Behaves like a bucket listing API over a sorted key set. Used for dry runs
//! and as the object storage fixture in tests.

use std::collections::{BTreeMap, BTreeSet};
use async_trait::async_trait;
use parking_lot::RwLock;

use common::error::Result;

use crate::remote::{ObjectListing, ObjectStoreClient};
use crate::s3path::split_s3_path;

/// Object store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    /// Bucket name -> object keys
    buckets: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

impl InMemoryObjectStore {
    /// Creates an empty object store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object
    pub fn put(&self, bucket: &str, key: &str) {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string());
    }

    /// Stores an object addressed by an `s3://bucket/key` URI
    pub fn put_path(&self, path: &str) -> Result<()> {
        let (bucket, key) = split_s3_path(path)?;
        self.put(&bucket, &key);
        Ok(())
    }

    /// Stores every object in the list, skipping malformed URIs
    pub fn put_all<'a, I>(&self, paths: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for path in paths {
            let _ = self.put_path(path);
        }
    }

    /// Returns the number of stored objects
    pub fn len(&self) -> usize {
        self.buckets.read().values().map(BTreeSet::len).sum()
    }

    /// Returns true if no objects are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_keys: usize,
    ) -> Result<ObjectListing> {
        let buckets = self.buckets.read();
        let mut listing = ObjectListing::default();

        let keys = match buckets.get(bucket) {
            Some(keys) => keys,
            None => return Ok(listing),
        };

        let mut seen_prefixes = BTreeSet::new();
        let mut returned = 0;

        for key in keys.range(prefix.to_string()..) {
            if !key.starts_with(prefix) || returned >= max_keys {
                break;
            }

            let rest = &key[prefix.len()..];
            let rolled_up = delimiter.and_then(|d| rest.find(d).map(|idx| idx + d.len()));

            match rolled_up {
                Some(end) => {
                    let common_prefix = format!("{}{}", prefix, &rest[..end]);
                    if seen_prefixes.insert(common_prefix.clone()) {
                        listing.common_prefixes.push(common_prefix);
                        returned += 1;
                    }
                }
                None => {
                    listing.keys.push(key.clone());
                    returned += 1;
                }
            }
        }

        Ok(listing)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self
            .buckets
            .read()
            .get(bucket)
            .map(|keys| keys.contains(key))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryObjectStore {
        let store = InMemoryObjectStore::new();
        store.put_all([
            "s3://bucket/a/1/model.onnx",
            "s3://bucket/a/2/model.onnx",
            "s3://bucket/a/notes.txt",
            "s3://bucket/ab/other",
            "s3://other/a/1/model.onnx",
        ]);
        store
    }

    #[tokio::test]
    async fn test_delimited_listing() {
        let listing = store().list_objects("bucket", "a/", Some("/"), 100).await.unwrap();
        assert_eq!(listing.common_prefixes, vec!["a/1/", "a/2/"]);
        assert_eq!(listing.keys, vec!["a/notes.txt"]);
    }

    #[tokio::test]
    async fn test_flat_listing_respects_prefix() {
        let listing = store().list_objects("bucket", "a", None, 100).await.unwrap();
        assert_eq!(listing.keys.len(), 4);
        assert!(listing.common_prefixes.is_empty());

        let listing = store().list_objects("bucket", "a/", None, 1).await.unwrap();
        assert_eq!(listing.keys, vec!["a/1/model.onnx"]);
    }

    #[tokio::test]
    async fn test_unknown_bucket_is_empty() {
        let listing = store().list_objects("missing", "", None, 100).await.unwrap();
        assert_eq!(listing, ObjectListing::default());
        assert!(!store().head_object("missing", "a").await.unwrap());
    }

    #[test]
    fn test_put_path_rejects_malformed_uri() {
        let store = InMemoryObjectStore::new();
        assert!(store.put_path("bucket/key").is_err());
        assert!(store.is_empty());
        store.put_path("s3://bucket/key").unwrap();
        assert_eq!(store.len(), 1);
    }
}
