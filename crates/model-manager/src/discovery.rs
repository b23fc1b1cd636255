//! Model discovery in a models directory
//!
//! When an API points at a folder instead of naming its models, every
//! immediate child of that folder is one model named after the child.

use tracing::{debug, info};

use common::error::{Error, Result};
use common::models::ModelResource;
use common::utils::is_hidden;
use storage_adapter::{BackendKind, StorageBackend};

/// Lists the models held in a directory
pub async fn discover(base_path: &str, backend: &dyn StorageBackend) -> Result<Vec<ModelResource>> {
    if !backend.is_directory(base_path).await? {
        let exists = backend.exists(base_path).await?;
        return Err(match (exists, backend.kind()) {
            (true, _) => Error::PathNotDirectory(base_path.to_string()),
            (false, BackendKind::Remote) => Error::S3DirNotFound(base_path.to_string()),
            (false, BackendKind::Local) => Error::InvalidPath(base_path.to_string()),
        });
    }

    let mut models = Vec::new();
    for child in backend.list_children(base_path).await? {
        let name = backend.base_name(&child);
        if is_hidden(name) {
            debug!("Skipping hidden entry {}", child);
            continue;
        }
        models.push(ModelResource::new(name, child.as_str()));
    }

    info!("Discovered {} models in {}", models.len(), base_path);

    Ok(models)
}
