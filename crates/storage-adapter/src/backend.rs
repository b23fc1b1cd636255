//! Storage backend capability set
//!
//! Everything above this crate talks to storage through [`StorageBackend`]
//! and never through a concrete backend.

use std::fmt;
use async_trait::async_trait;

use common::error::Result;
use common::utils::base_name;

/// Kind of storage a path lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Local filesystem
    Local,
    /// Object storage
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "s3"),
        }
    }
}

/// Operations model resolution needs from a storage backend
///
/// Paths are strings in the backend's native form: absolute filesystem paths
/// for local storage, `s3://bucket/key` URIs for object storage. Retries, if
/// any, are the backend's own concern.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Returns the kind of storage this backend reads
    fn kind(&self) -> BackendKind;

    /// Joins a child name onto a base path
    fn join(&self, base: &str, child: &str) -> String;

    /// Returns the final component of a path
    fn base_name<'a>(&self, path: &'a str) -> &'a str {
        base_name(path)
    }

    /// Lists the immediate children of a directory as full paths
    async fn list_children(&self, path: &str) -> Result<Vec<String>>;

    /// Lists every file below a directory, relative to it and `/`-separated
    async fn list_descendants(&self, path: &str, include_hidden: bool) -> Result<Vec<String>>;

    /// Returns true if the path is a directory
    async fn is_directory(&self, path: &str) -> Result<bool>;

    /// Returns true only if every path exists as a file
    async fn is_file(&self, paths: &[&str]) -> Result<bool>;

    /// Returns true if any file path starts with the prefix
    async fn is_prefix_of_any(&self, prefix: &str) -> Result<bool>;

    /// Returns true if the path exists as either a file or a directory
    async fn exists(&self, path: &str) -> Result<bool> {
        if self.is_directory(path).await? {
            return Ok(true);
        }
        self.is_file(&[path]).await
    }
}
