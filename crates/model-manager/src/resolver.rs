//! Declared path resolution
//!
//! Object storage URIs pass through untouched. Local paths become absolute:
//! `~` expands to the home directory and relative paths are anchored at the
//! project directory. Resolution is lexical; nothing is read from disk.

use std::path::{Component, Path, PathBuf};

use common::error::{Error, Result};
use storage_adapter::s3path::is_s3_uri;

/// Resolves a declared model path to an absolute path or object storage URI
pub fn resolve(path: &str, project_root: impl AsRef<Path>) -> Result<String> {
    if is_s3_uri(path) {
        return Ok(path.to_string());
    }

    let absolute = if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        home.join(path.trim_start_matches('~').trim_start_matches('/'))
    } else {
        project_root.as_ref().join(path)
    };

    Ok(clean(&absolute).to_string_lossy().into_owned())
}

/// Removes `.` and `..` components without touching the filesystem
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                let last = cleaned.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    cleaned.pop();
                } else if !matches!(last, Some(Component::RootDir | Component::Prefix(_))) {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_paths_are_untouched() {
        assert_eq!(resolve("s3://bucket/models/../x", "/project").unwrap(), "s3://bucket/models/../x");
    }

    #[test]
    fn test_relative_paths_use_project_root() {
        assert_eq!(resolve("models/mnist", "/project").unwrap(), "/project/models/mnist");
        assert_eq!(resolve("./models/../onnx/iris", "/project").unwrap(), "/project/onnx/iris");
        assert_eq!(resolve("../shared/model", "/project/api").unwrap(), "/project/shared/model");
    }

    #[test]
    fn test_absolute_paths_stay_absolute() {
        assert_eq!(resolve("/data/model", "/project").unwrap(), "/data/model");
        assert_eq!(resolve("/../data", "/project").unwrap(), "/data");
    }

    #[test]
    fn test_home_expansion() {
        if let Some(home) = dirs::home_dir() {
            let resolved = resolve("~/models/mnist", "/project").unwrap();
            assert_eq!(resolved, home.join("models/mnist").to_string_lossy());
            assert_eq!(resolve("~", "/project").unwrap(), clean(&home).to_string_lossy());
        }
    }

    #[test]
    fn test_tilde_inside_name_is_not_expanded() {
        assert_eq!(resolve("~models", "/project").unwrap(), "/project/~models");
    }
}
