//! Model declaration curation
//!
//! Curation resolves each declared path, brings directories to their
//! canonical `path/` form and tags each model with its storage kind. Single
//! file ONNX exports keep their file path and lose the `.onnx` suffix from
//! their name.

use std::path::Path;
use tracing::debug;

use common::error::Result;
use common::models::{CuratedModelResource, ModelResource};
use common::types::PredictorType;
use common::utils::ensure_suffix;
use storage_adapter::s3path::is_s3_uri;

use crate::resolver::resolve;

/// File extension of ONNX exports
pub const ONNX_EXTENSION: &str = ".onnx";

/// Curates model declarations, preserving their order
pub fn curate(
    resources: &[ModelResource],
    predictor_type: PredictorType,
    project_root: impl AsRef<Path>,
) -> Result<Vec<CuratedModelResource>> {
    let project_root = project_root.as_ref();

    resources
        .iter()
        .map(|resource| curate_one(resource, predictor_type, project_root))
        .collect()
}

fn curate_one(
    resource: &ModelResource,
    predictor_type: PredictorType,
    project_root: &Path,
) -> Result<CuratedModelResource> {
    let is_remote = is_s3_uri(&resource.model_path);
    let path = if is_remote {
        resource.model_path.clone()
    } else {
        resolve(&resource.model_path, project_root)?
    };

    let trimmed = path.trim_end_matches('/');
    let (name, model_path) =
        if predictor_type == PredictorType::Onnx && trimmed.ends_with(ONNX_EXTENSION) {
            let name = resource
                .name
                .strip_suffix(ONNX_EXTENSION)
                .unwrap_or(&resource.name)
                .to_string();
            (name, trimmed.to_string())
        } else {
            (resource.name.clone(), ensure_suffix(trimmed, "/"))
        };

    debug!("Curated model {} at {}", name, model_path);

    Ok(CuratedModelResource {
        name,
        model_path,
        signature_key: resource.signature_key.clone(),
        is_remote,
    })
}
