//! Versioned model layout validation
//!
//! A versioned model is a directory of version directories, each named by a
//! non-negative integer (usually a timestamp):
//!
//! ```text
//! model-name/
//!     1523423423/
//!         <framework specific contents>
//!     2434389194/
//!         <framework specific contents>
//! ```
//!
//! The walk is the same for every framework and every backend; a
//! [`LayoutPolicy`] supplies what a version directory has to contain.
//!
//! | Policy             | Version directory contents                                              |
//! |--------------------|-------------------------------------------------------------------------|
//! | `TensorFlow`       | `saved_model.pb`, `variables/variables.index`, `variables/variables.data-00000-of-*` |
//! | `TensorFlowNeuron` | `saved_model.pb`                                                        |
//! | `Onnx`             | exactly one `*.onnx` file and nothing else                              |
//! | `Python`           | anything; empty version directories are skipped                         |

use tracing::{debug, warn};

use common::error::{Error, Result};
use common::types::{Framework, PredictorType, Version};
use common::utils::{is_hidden, parse_version, unique_versions};
use storage_adapter::StorageBackend;

use crate::curator::ONNX_EXTENSION;

const SAVED_MODEL: &str = "saved_model.pb";
const VARIABLES_INDEX: &str = "variables/variables.index";
const VARIABLES_DATA_PREFIX: &str = "variables/variables.data-00000-of";

/// Structural contract for one framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// TensorFlow SavedModel export
    TensorFlow,
    /// TensorFlow export compiled for Inferentia; weights live inside the graph
    TensorFlowNeuron,
    /// ONNX export, one file per version
    Onnx,
    /// Opaque Python artifacts
    Python,
}

impl LayoutPolicy {
    /// Selects the policy for a predictor
    pub fn for_predictor(predictor_type: PredictorType, neuron: bool) -> Self {
        match predictor_type {
            PredictorType::TensorFlow if neuron => LayoutPolicy::TensorFlowNeuron,
            PredictorType::TensorFlow => LayoutPolicy::TensorFlow,
            PredictorType::Onnx => LayoutPolicy::Onnx,
            PredictorType::Python => LayoutPolicy::Python,
        }
    }

    /// Returns the framework named in diagnostics
    pub fn framework(&self) -> Framework {
        match self {
            LayoutPolicy::TensorFlow | LayoutPolicy::TensorFlowNeuron => Framework::TensorFlow,
            LayoutPolicy::Onnx => Framework::Onnx,
            LayoutPolicy::Python => Framework::Python,
        }
    }

    /// Files every version directory must contain
    pub fn required_files(&self) -> &'static [&'static str] {
        match self {
            LayoutPolicy::TensorFlow => &[SAVED_MODEL, VARIABLES_INDEX],
            LayoutPolicy::TensorFlowNeuron => &[SAVED_MODEL],
            LayoutPolicy::Onnx | LayoutPolicy::Python => &[],
        }
    }

    /// Prefix at least one file in every version directory must start with
    pub fn required_prefix(&self) -> Option<&'static str> {
        match self {
            LayoutPolicy::TensorFlow => Some(VARIABLES_DATA_PREFIX),
            _ => None,
        }
    }

    /// Whether an empty version directory is skipped rather than rejected
    pub fn skips_empty_versions(&self) -> bool {
        matches!(self, LayoutPolicy::Python)
    }

    /// Whether a version directory must hold exactly one `.onnx` file and nothing else
    pub fn requires_single_onnx_file(&self) -> bool {
        matches!(self, LayoutPolicy::Onnx)
    }

    fn is_neuron(&self) -> bool {
        matches!(self, LayoutPolicy::TensorFlowNeuron)
    }

    /// Error for a listing that does not follow the layout
    fn invalid_layout(&self, path: &str, listing: &[String]) -> Error {
        let path = path.to_string();
        let listing = listing.to_vec();
        match self.framework() {
            Framework::TensorFlow => Error::InvalidTensorFlowModelPath {
                path,
                listing,
                neuron: self.is_neuron(),
            },
            Framework::Onnx => Error::InvalidOnnxModelPath { path, listing },
            Framework::Python => Error::InvalidPythonModelPath { path, listing },
        }
    }

    /// Error for a version entry that is not a directory
    fn version_not_directory(&self, path: &str, listing: &[String], version_path: &str) -> Error {
        match self.framework() {
            Framework::TensorFlow => self.invalid_layout(path, listing),
            framework => Error::ModelVersionPathMustBeDirectory {
                framework,
                path: path.to_string(),
                version_path: version_path.to_string(),
            },
        }
    }
}

/// Validates versioned model directories on one backend
pub struct VersionedLayoutValidator<'a> {
    /// Backend the model lives on
    backend: &'a dyn StorageBackend,
    
    /// Structural contract to enforce
    policy: LayoutPolicy,
}

impl<'a> VersionedLayoutValidator<'a> {
    /// Creates a new validator
    pub fn new(backend: &'a dyn StorageBackend, policy: LayoutPolicy) -> Self {
        Self { backend, policy }
    }

    /// Returns the policy being enforced
    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    /// Validates a model directory and returns its versions
    ///
    /// Fails on the first version that breaks the layout; later versions are
    /// not inspected. The returned versions are unique and sorted.
    pub async fn validate(&self, base_path: &str) -> Result<Vec<Version>> {
        // Errors report the raw listing, hidden entries included
        let listing = self.backend.list_children(base_path).await?;
        let visible: Vec<&String> = listing
            .iter()
            .filter(|child| !is_hidden(self.backend.base_name(child)))
            .collect();

        if visible.is_empty() {
            return Err(Error::NoVersionsFound {
                framework: self.policy.framework(),
                path: base_path.to_string(),
            });
        }

        let mut versions = Vec::with_capacity(visible.len());
        for child in visible {
            let version_name = self.backend.base_name(child);
            let version = parse_version(version_name)
                .ok_or_else(|| self.policy.invalid_layout(base_path, &listing))?;

            let version_path = self.backend.join(base_path, version_name);
            if !self.backend.is_directory(&version_path).await? {
                return Err(self.policy.version_not_directory(base_path, &listing, &version_path));
            }

            if self.check_version(base_path, &listing, &version_path).await? {
                debug!("Validated {} version {} at {}", self.policy.framework(), version, version_path);
                versions.push(version);
            }
        }

        Ok(unique_versions(versions))
    }

    /// Returns true if any visible child of the base path is a version directory
    ///
    /// A directory with no such child is plainly not versioned, whatever else
    /// it holds.
    pub async fn has_version_directories(&self, base_path: &str) -> Result<bool> {
        for child in self.backend.list_children(base_path).await? {
            let name = self.backend.base_name(&child);
            if is_hidden(name) || parse_version(name).is_none() {
                continue;
            }
            if self.backend.is_directory(&child).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Checks one version directory against the policy
    ///
    /// Returns false when the version is skipped rather than accepted.
    async fn check_version(&self, base_path: &str, listing: &[String], version_path: &str) -> Result<bool> {
        let required: Vec<String> = self
            .policy
            .required_files()
            .iter()
            .map(|file| self.backend.join(version_path, file))
            .collect();
        if !required.is_empty() {
            let required: Vec<&str> = required.iter().map(String::as_str).collect();
            if !self.backend.is_file(&required).await? {
                return Err(self.policy.invalid_layout(base_path, listing));
            }
        }

        if let Some(prefix) = self.policy.required_prefix() {
            let prefix = self.backend.join(version_path, prefix);
            if !self.backend.is_prefix_of_any(&prefix).await? {
                return Err(self.policy.invalid_layout(base_path, listing));
            }
        }

        if self.policy.requires_single_onnx_file() {
            self.check_single_onnx_file(base_path, listing, version_path).await?;
        }

        if self.policy.skips_empty_versions()
            && self.backend.list_children(version_path).await?.is_empty()
        {
            warn!("Skipping empty version directory {}", version_path);
            return Ok(false);
        }

        Ok(true)
    }

    async fn check_single_onnx_file(&self, base_path: &str, listing: &[String], dir: &str) -> Result<()> {
        let entries = self.backend.list_children(dir).await?;

        let mut onnx_files = 0;
        for entry in &entries {
            if !entry.ends_with(ONNX_EXTENSION) || !self.backend.is_file(&[entry.as_str()]).await? {
                return Err(self.policy.invalid_layout(base_path, listing));
            }
            onnx_files += 1;
        }

        if onnx_files != 1 {
            return Err(self.policy.invalid_layout(base_path, listing));
        }

        Ok(())
    }

    /// Validates a model that is not split into versions
    ///
    /// Python models must be a non-empty directory; ONNX models must be a
    /// directory holding exactly one `.onnx` file. TensorFlow models are
    /// always versioned, so they are rejected here.
    pub async fn validate_unversioned(&self, base_path: &str) -> Result<()> {
        let listing = self.backend.list_children(base_path).await?;

        match self.policy {
            LayoutPolicy::Python if !listing.is_empty() => Ok(()),
            LayoutPolicy::Onnx => self.check_single_onnx_file(base_path, &listing, base_path).await,
            _ => Err(self.policy.invalid_layout(base_path, &listing)),
        }
    }
}
