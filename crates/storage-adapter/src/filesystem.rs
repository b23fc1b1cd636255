//! Local filesystem backend
//!
//! Metadata and single-level listings go through `tokio::fs`; recursive
//! walks run `walkdir` on the blocking pool.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tracing::trace;
use walkdir::WalkDir;

use common::error::{Error, Result};
use common::utils::is_hidden;

use crate::backend::{BackendKind, StorageBackend};

/// Storage backend over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemAdapter;

impl FilesystemAdapter {
    /// Creates a new filesystem adapter
    pub fn new() -> Self {
        Self
    }

    async fn metadata(path: &str) -> Result<Option<std::fs::Metadata>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::backend(path, e)),
        }
    }
}

/// Renders a path relative to `root` with `/` separators
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn walk_files(root: PathBuf, include_hidden: bool) -> Result<Vec<String>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // The root itself may live under a dot-directory
            entry.depth() == 0 || include_hidden || !is_hidden(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = entry.map_err(|e| Error::backend(root.to_string_lossy(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(relative) = relative_slash_path(&root, entry.path()) {
            files.push(relative);
        }
    }

    Ok(files)
}

#[async_trait]
impl StorageBackend for FilesystemAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn join(&self, base: &str, child: &str) -> String {
        Path::new(base)
            .join(child.trim_start_matches('/'))
            .to_string_lossy()
            .into_owned()
    }

    async fn list_children(&self, path: &str) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| Error::backend(path, e))?;

        let mut children = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::backend(path, e))?
        {
            children.push(entry.path().to_string_lossy().into_owned());
        }
        children.sort();

        trace!("Listed {} children under {}", children.len(), path);

        Ok(children)
    }

    async fn list_descendants(&self, path: &str, include_hidden: bool) -> Result<Vec<String>> {
        let root = PathBuf::from(path);
        tokio::task::spawn_blocking(move || walk_files(root, include_hidden))
            .await
            .map_err(|e| Error::Internal(format!("directory walk of {} failed: {}", path, e)))?
    }

    async fn is_directory(&self, path: &str) -> Result<bool> {
        Ok(Self::metadata(path).await?.map(|m| m.is_dir()).unwrap_or(false))
    }

    async fn is_file(&self, paths: &[&str]) -> Result<bool> {
        for path in paths {
            let is_file = Self::metadata(path).await?.map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn is_prefix_of_any(&self, prefix: &str) -> Result<bool> {
        let prefix_path = Path::new(prefix);
        let (parent, stem) = if prefix.ends_with('/') {
            (prefix_path.to_path_buf(), String::new())
        } else {
            match (prefix_path.parent(), prefix_path.file_name()) {
                (Some(parent), Some(name)) => {
                    (parent.to_path_buf(), name.to_string_lossy().into_owned())
                }
                _ => return Ok(false),
            }
        };

        if !self.is_directory(&parent.to_string_lossy()).await? {
            return Ok(false);
        }

        tokio::task::spawn_blocking(move || {
            for entry in WalkDir::new(&parent).min_depth(1) {
                let entry = entry.map_err(|e| Error::backend(parent.to_string_lossy(), e))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(relative) = relative_slash_path(&parent, entry.path()) {
                    if relative.starts_with(&stem) {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        })
        .await
        .map_err(|e| Error::Internal(format!("prefix scan of {} failed: {}", prefix, e)))?
    }
}
