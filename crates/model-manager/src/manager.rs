//! Model resolution pipeline
//!
//! Ties the pieces together for one API declaration: pick the backend for
//! each path, discover or take the declared models, curate them, reject
//! duplicate names and validate every model against its layout policy.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use common::error::{Error, Result};
use common::models::{ApiDeclaration, CuratedModelResource, ModelResource, ResolvedApi, ResolvedModel};
use common::types::Version;
use common::utils::{format_duration, measure_execution_time_async};
use config::ResolverSettings;
use storage_adapter::s3path::is_s3_uri;
use storage_adapter::{BackendKind, FilesystemAdapter, ObjectStoreClient, RemoteBackend, StorageBackend};

use crate::curator::curate;
use crate::discovery::discover;
use crate::duplicates::{check_duplicate_models, find_duplicate_apis};
use crate::resolver::resolve;
use crate::versioning::{LayoutPolicy, VersionedLayoutValidator};

/// Resolves API declarations into validated models
pub struct ModelManager {
    /// Resolver settings
    settings: ResolverSettings,
    
    /// Absolute project directory
    project_dir: PathBuf,
    
    /// Local filesystem backend
    local: FilesystemAdapter,
    
    /// Object storage client for `s3://` paths
    object_store: Option<Arc<dyn ObjectStoreClient>>,
}

impl ModelManager {
    /// Creates a new model manager from resolver settings
    pub fn from_settings(settings: ResolverSettings) -> Result<Self> {
        let project_dir = absolute_project_dir(&settings.project_dir)?;
        debug!("Resolving relative model paths against {:?}", project_dir);

        Ok(Self {
            settings,
            project_dir,
            local: FilesystemAdapter::new(),
            object_store: None,
        })
    }

    /// Sets the object storage client used for `s3://` paths
    pub fn with_object_store(mut self, client: Arc<dyn ObjectStoreClient>) -> Self {
        self.object_store = Some(client);
        self
    }

    /// Returns the resolver settings
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Returns the directory relative paths are resolved against
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn backend_for(&self, path: &str, max_keys: usize) -> Result<Box<dyn StorageBackend>> {
        if !is_s3_uri(path) {
            return Ok(Box::new(self.local));
        }

        let client = self.object_store.clone().ok_or_else(|| {
            Error::Config(format!("{}: no object storage client is configured", path))
        })?;

        Ok(Box::new(RemoteBackend::new(client).with_max_keys(max_keys)))
    }

    /// Resolves every API, rejecting duplicate API names up front
    pub async fn resolve_apis(&self, apis: &[ApiDeclaration]) -> Result<Vec<ResolvedApi>> {
        if let Some(group) = find_duplicate_apis(apis) {
            return Err(Error::DuplicateApiNames {
                name: group[0].name.clone(),
                count: group.len(),
            });
        }

        let mut resolved = Vec::with_capacity(apis.len());
        for api in apis {
            let models = self.resolve_api(api).await?;
            resolved.push(ResolvedApi {
                name: api.name.clone(),
                predictor_type: api.predictor_type,
                models,
            });
        }

        Ok(resolved)
    }

    /// Resolves and validates the models of one API
    pub async fn resolve_api(&self, api: &ApiDeclaration) -> Result<Vec<ResolvedModel>> {
        info!("Resolving {} models for API {}", api.predictor_type, api.name);

        let (models, elapsed) = measure_execution_time_async(self.resolve_models(api)).await?;

        info!(
            "Resolved {} models for API {} in {}",
            models.len(),
            api.name,
            format_duration(elapsed)
        );

        Ok(models)
    }

    async fn resolve_models(&self, api: &ApiDeclaration) -> Result<Vec<ResolvedModel>> {
        let declared = self.declared_models(api).await?;

        let curated = curate(&declared, api.predictor_type, &self.project_dir)?;
        check_duplicate_models(&curated)?;

        let policy = LayoutPolicy::for_predictor(api.predictor_type, api.neuron);
        let may_be_unversioned =
            self.settings.allow_unversioned && !api.predictor_type.requires_versions();

        let mut resolved = Vec::with_capacity(curated.len());
        for resource in curated {
            let versions = self.resolve_model(&resource, policy, may_be_unversioned).await?;
            resolved.push(ResolvedModel { resource, versions });
        }

        Ok(resolved)
    }

    async fn declared_models(&self, api: &ApiDeclaration) -> Result<Vec<ModelResource>> {
        if !api.models.is_empty() {
            return Ok(api.models.clone());
        }

        let models_dir = api.models_dir.as_deref().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "API {} declares neither models nor a models directory",
                api.name
            ))
        })?;

        let models_dir = if is_s3_uri(models_dir) {
            models_dir.to_string()
        } else {
            resolve(models_dir, &self.project_dir)?
        };

        let backend = self.backend_for(&models_dir, self.settings.discovery_max_keys)?;
        discover(&models_dir, backend.as_ref()).await
    }

    async fn resolve_model(
        &self,
        resource: &CuratedModelResource,
        policy: LayoutPolicy,
        may_be_unversioned: bool,
    ) -> Result<Option<Vec<Version>>> {
        let path = resource.model_path.as_str();
        let backend = self.backend_for(path, self.settings.version_listing_max_keys)?;

        // Single file ONNX export
        if resource.is_single_file() {
            if !backend.is_file(&[path]).await? {
                return Err(Error::InvalidPath(path.to_string()));
            }
            debug!("Model {} is a single file export", resource.name);
            return Ok(None);
        }

        if !backend.is_directory(path).await? {
            return Err(match backend.kind() {
                BackendKind::Remote => Error::S3DirNotFound(path.to_string()),
                BackendKind::Local => Error::InvalidPath(path.to_string()),
            });
        }

        let validator = VersionedLayoutValidator::new(backend.as_ref(), policy);
        match validator.validate(path).await {
            Ok(versions) => {
                if versions.is_empty() {
                    warn!("Model {} at {} has no usable versions", resource.name, path);
                }
                debug!("Model {} has versions {:?}", resource.name, versions);
                Ok(Some(versions))
            }
            // One bad entry next to real version directories fails the model
            Err(err) if may_be_unversioned && err.is_invalid_layout() => {
                if validator.has_version_directories(path).await?
                    || validator.validate_unversioned(path).await.is_err()
                {
                    return Err(err);
                }
                info!("Model {} at {} is not versioned", resource.name, path);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

fn absolute_project_dir(project_dir: &Path) -> Result<PathBuf> {
    if project_dir.is_absolute() {
        return Ok(project_dir.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(project_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use common::types::PredictorType;
    use storage_adapter::InMemoryObjectStore;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn manager(project_dir: &Path) -> ModelManager {
        let settings = ResolverSettings {
            project_dir: project_dir.to_path_buf(),
            ..ResolverSettings::default()
        };
        ModelManager::from_settings(settings).unwrap()
    }

    #[tokio::test]
    async fn test_explicit_relative_model() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "models/iris/3/model.onnx");

        let api = ApiDeclaration::new("iris-api", PredictorType::Onnx)
            .with_model(ModelResource::new("iris", "models/iris"));
        let models = manager(dir.path()).resolve_api(&api).await.unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name(), "iris");
        assert_eq!(models[0].versions, Some(vec![3]));
        assert!(models[0].resource.model_path.ends_with("models/iris/"));
        assert!(!models[0].resource.is_remote);
    }

    #[tokio::test]
    async fn test_single_file_onnx_is_unversioned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "iris.onnx");

        let api = ApiDeclaration::new("iris-api", PredictorType::Onnx)
            .with_model(ModelResource::new("iris.onnx", "iris.onnx"));
        let models = manager(dir.path()).resolve_api(&api).await.unwrap();

        assert_eq!(models[0].name(), "iris");
        assert!(!models[0].is_versioned());

        let api = ApiDeclaration::new("iris-api", PredictorType::Onnx)
            .with_model(ModelResource::new("missing", "missing.onnx"));
        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_unversioned_fallback_follows_setting() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "text/predictor.pkl");

        let api = ApiDeclaration::new("text-api", PredictorType::Python)
            .with_model(ModelResource::new("text", "text"));

        let models = manager(dir.path()).resolve_api(&api).await.unwrap();
        assert_eq!(models[0].versions, None);

        let settings = ResolverSettings {
            project_dir: dir.path().to_path_buf(),
            allow_unversioned: false,
            ..ResolverSettings::default()
        };
        let strict = ModelManager::from_settings(settings).unwrap();
        let err = strict.resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPythonModelPath { .. }));
    }

    #[tokio::test]
    async fn test_stray_entry_among_versions_is_not_unversioned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "m/1/model.pkl");
        touch(dir.path(), "m/2/model.pkl");
        touch(dir.path(), "m/latest/model.pkl");

        let api = ApiDeclaration::new("api", PredictorType::Python)
            .with_model(ModelResource::new("m", "m"));
        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();

        match err {
            Error::InvalidPythonModelPath { listing, .. } => assert_eq!(listing.len(), 3),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_numeric_file_in_unversioned_model() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "m/0");
        touch(dir.path(), "m/predictor.pkl");

        let api = ApiDeclaration::new("api", PredictorType::Python)
            .with_model(ModelResource::new("m", "m"));
        let models = manager(dir.path()).resolve_api(&api).await.unwrap();
        assert_eq!(models[0].versions, None);

        touch(dir.path(), "iris/1");
        touch(dir.path(), "iris/iris.onnx");
        let api = ApiDeclaration::new("api", PredictorType::Onnx)
            .with_model(ModelResource::new("iris", "iris"));
        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::ModelVersionPathMustBeDirectory { .. }));
    }

    #[tokio::test]
    async fn test_empty_onnx_version_fails_through_manager() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("iris/3")).unwrap();

        let api = ApiDeclaration::new("api", PredictorType::Onnx)
            .with_model(ModelResource::new("iris", "iris"));
        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOnnxModelPath { .. }));
    }

    #[tokio::test]
    async fn test_tensorflow_is_never_unversioned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tf/saved_model.pb");

        let api = ApiDeclaration::new("tf-api", PredictorType::TensorFlow)
            .with_model(ModelResource::new("tf", "tf"));
        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTensorFlowModelPath { .. }));
    }

    #[tokio::test]
    async fn test_missing_model_directory() {
        let dir = TempDir::new().unwrap();
        let api = ApiDeclaration::new("api", PredictorType::Python)
            .with_model(ModelResource::new("gone", "gone"));

        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_remote_models_dir() {
        let store = InMemoryObjectStore::new();
        store.put_all([
            "s3://models/tf/resnet/1/saved_model.pb",
            "s3://models/tf/resnet/2/saved_model.pb",
            "s3://models/tf/bert/5/saved_model.pb",
        ]);
        let dir = TempDir::new().unwrap();
        let manager = manager(dir.path()).with_object_store(Arc::new(store));

        let api = ApiDeclaration::new("inf", PredictorType::TensorFlow)
            .with_models_dir("s3://models/tf")
            .with_neuron(true);
        let models = manager.resolve_api(&api).await.unwrap();

        let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["bert", "resnet"]);
        assert_eq!(models[1].versions, Some(vec![1, 2]));
        assert!(models.iter().all(|m| m.resource.is_remote));
        assert_eq!(models[0].resource.model_path, "s3://models/tf/bert/");
    }

    #[tokio::test]
    async fn test_remote_path_without_client() {
        let dir = TempDir::new().unwrap();
        let api = ApiDeclaration::new("api", PredictorType::Python)
            .with_model(ModelResource::new("m", "s3://bucket/m"));

        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_remote_missing_directory() {
        let dir = TempDir::new().unwrap();
        let manager = manager(dir.path()).with_object_store(Arc::new(InMemoryObjectStore::new()));
        let api = ApiDeclaration::new("api", PredictorType::Python)
            .with_model(ModelResource::new("m", "s3://bucket/m"));

        let err = manager.resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::S3DirNotFound(ref path) if path == "s3://bucket/m/"));
    }

    #[tokio::test]
    async fn test_declaration_without_models() {
        let dir = TempDir::new().unwrap();
        let api = ApiDeclaration::new("empty", PredictorType::Python);

        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_duplicate_model_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/1/model.pkl");
        touch(dir.path(), "b/1/model.pkl");

        let api = ApiDeclaration::new("api", PredictorType::Python)
            .with_model(ModelResource::new("model", "a"))
            .with_model(ModelResource::new("model", "b"));

        let err = manager(dir.path()).resolve_api(&api).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateModelNames(ref name) if name == "model"));
    }

    #[tokio::test]
    async fn test_duplicate_api_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let apis = vec![
            ApiDeclaration::new("api", PredictorType::Python),
            ApiDeclaration::new("api", PredictorType::Onnx),
        ];

        let err = manager(dir.path()).resolve_apis(&apis).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateApiNames { ref name, count: 2 } if name == "api"));
    }

    #[test]
    fn test_relative_project_dir_is_absolutized() {
        let manager = ModelManager::from_settings(ResolverSettings::default()).unwrap();
        assert!(manager.project_dir().is_absolute());
    }
}
