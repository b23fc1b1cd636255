//! Main integration module for the model resolver
//!
//! This module wires configuration, logging, storage and the resolution
//! pipeline together and provides the entry point for the command line tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use tracing::{debug, info};

use common::models::{ApiDeclaration, ResolvedApi, ResolvedModel};
use config::{ConfigManager, ResolverSettings};
use model_manager::ModelManager;

/// Overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Configuration file to load
    pub config_path: Option<PathBuf>,

    /// Project directory overriding the configured one
    pub project_dir: Option<PathBuf>,

    /// Emit JSON logs regardless of configuration
    pub json_logs: bool,
}

/// Main model resolver application
pub struct ModelResolverApp {
    /// Configuration manager
    config_manager: Arc<ConfigManager>,

    /// Effective settings after overrides
    settings: ResolverSettings,

    /// Model manager
    model_manager: Arc<ModelManager>,
}

impl ModelResolverApp {
    /// Creates a new model resolver application
    pub async fn new(options: &AppOptions) -> Result<Self> {
        // Load configuration
        let config_manager = match &options.config_path {
            Some(path) => ConfigManager::from_file(path)
                .with_context(|| format!("failed to load configuration from {:?}", path))?,
            None => ConfigManager::new().context("failed to load configuration")?,
        };
        let config_manager = Arc::new(config_manager);

        let settings = Self::apply_overrides(config_manager.settings().clone(), options);

        // Initialize logging
        logging::init_logging(&settings.logging)?;

        info!("Initializing model resolver");
        debug!("Effective settings: {:?}", settings);

        let model_manager = ModelManager::from_settings(settings.clone())?;
        let model_manager = Arc::new(Self::attach_object_store(model_manager, &settings).await);

        Ok(Self {
            config_manager,
            settings,
            model_manager,
        })
    }

    fn apply_overrides(mut settings: ResolverSettings, options: &AppOptions) -> ResolverSettings {
        if let Some(project_dir) = &options.project_dir {
            settings.project_dir = project_dir.clone();
        }
        if options.json_logs {
            settings.logging.json = true;
        }
        settings
    }

    #[cfg(feature = "s3")]
    async fn attach_object_store(manager: ModelManager, settings: &ResolverSettings) -> ModelManager {
        let client = storage_adapter::S3ObjectClient::from_env(settings.s3_region.clone()).await;
        manager.with_object_store(Arc::new(client))
    }

    #[cfg(not(feature = "s3"))]
    async fn attach_object_store(manager: ModelManager, _settings: &ResolverSettings) -> ModelManager {
        debug!("Built without the s3 feature; s3:// paths cannot be resolved");
        manager
    }

    /// Resolves the models of one API
    pub async fn resolve_api(&self, api: &ApiDeclaration) -> Result<Vec<ResolvedModel>> {
        Ok(self.model_manager.resolve_api(api).await?)
    }

    /// Resolves a set of APIs
    pub async fn resolve_apis(&self, apis: &[ApiDeclaration]) -> Result<Vec<ResolvedApi>> {
        Ok(self.model_manager.resolve_apis(apis).await?)
    }

    /// Gets the configuration manager
    pub fn get_config_manager(&self) -> Arc<ConfigManager> {
        self.config_manager.clone()
    }

    /// Gets the model manager
    pub fn get_model_manager(&self) -> Arc<ModelManager> {
        self.model_manager.clone()
    }

    /// Gets the effective settings
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }
}

/// Reads API declarations from a JSON file holding an array of declarations
pub fn load_declarations(path: impl AsRef<Path>) -> Result<Vec<ApiDeclaration>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {:?}", path))?;
    let apis = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse API declarations in {:?}", path))?;
    Ok(apis)
}
