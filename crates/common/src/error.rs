//! Error types for the common crate
//!
//! This module defines the error types produced while resolving and validating
//! model artifacts. Structural errors keep the offending path and the raw
//! listing so callers can inspect them without parsing messages.

use thiserror::Error;

use crate::types::Framework;

/// Result type for model resolver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for model resolver operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage backend failure while inspecting a path
    #[error("{path}: {message}")]
    Backend {
        /// Path under inspection
        path: String,
        /// Backend-provided description
        message: String,
    },

    /// Declared path does not exist
    #[error("{0}: path does not exist")]
    InvalidPath(String),

    /// Declared path is not a directory
    #[error("{0}: path must be a directory")]
    PathNotDirectory(String),

    /// Object storage prefix has no objects under it
    #[error("{0}: S3 directory not found")]
    S3DirNotFound(String),

    /// Malformed object storage URI
    #[error("{0}: invalid S3 path (expected s3://bucket/key)")]
    InvalidS3Path(String),

    /// Two models share a name
    #[error("duplicate model names detected: multiple models are named \"{0}\"")]
    DuplicateModelNames(String),

    /// Two APIs share a name
    #[error("{count} APIs are named \"{name}\"")]
    DuplicateApiNames {
        /// Shared name
        name: String,
        /// Number of APIs with that name
        count: usize,
    },

    /// Rolling update value is neither a non-negative integer nor a percentage in 0-100
    #[error("\"{0}\" is not a valid value; must be an integer greater than or equal to 0, or a percentage between 0% and 100% (e.g. 25%)")]
    InvalidSurgeOrUnavailable(String),

    /// Rolling update would make no progress
    #[error("max_surge and max_unavailable cannot both be zero")]
    SurgeAndUnavailableBothZero,

    /// Model path has no children at all
    #[error("{path}: no versions found for {framework} model; expected version directories (e.g. {path}1600000000/)")]
    NoVersionsFound {
        /// Framework the model targets
        framework: Framework,
        /// Model base path
        path: String,
    },

    /// TensorFlow model path does not follow the SavedModel versioned layout
    #[error("{path}: invalid TensorFlow model path; found {}, expected {}", render_listing(.listing), tensorflow_layout(.neuron))]
    InvalidTensorFlowModelPath {
        /// Model base path
        path: String,
        /// Raw child listing of the base path
        listing: Vec<String>,
        /// Whether a Neuron export was requested
        neuron: bool,
    },

    /// ONNX model path does not follow the versioned layout
    #[error("{path}: invalid ONNX model path; found {}, expected each version directory to hold exactly one .onnx file (e.g. {path}1600000000/model.onnx)", render_listing(.listing))]
    InvalidOnnxModelPath {
        /// Model base path
        path: String,
        /// Raw child listing of the base path
        listing: Vec<String>,
    },

    /// Python model path does not follow the versioned layout
    #[error("{path}: invalid Python model path; found {}, expected version directories (e.g. {path}1600000000/*)", render_listing(.listing))]
    InvalidPythonModelPath {
        /// Model base path
        path: String,
        /// Raw child listing of the base path
        listing: Vec<String>,
    },

    /// A version entry exists but is not a directory
    #[error("{version_path}: {framework} model version path must be a directory (model path: {path})")]
    ModelVersionPathMustBeDirectory {
        /// Framework the model targets
        framework: Framework,
        /// Model base path
        path: String,
        /// Offending version path
        version_path: String,
    },

    /// Invalid argument error
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a backend error for a path
    pub fn backend(path: impl Into<String>, message: impl ToString) -> Self {
        Error::Backend {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Returns true if the error is a backend failure rather than a validation failure
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend { .. } | Error::Io(_))
    }

    /// Returns true if the error describes a malformed model layout
    pub fn is_invalid_layout(&self) -> bool {
        matches!(
            self,
            Error::NoVersionsFound { .. }
                | Error::InvalidTensorFlowModelPath { .. }
                | Error::InvalidOnnxModelPath { .. }
                | Error::InvalidPythonModelPath { .. }
                | Error::ModelVersionPathMustBeDirectory { .. }
        )
    }

    /// Returns true if the error is a name collision
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateModelNames(_) | Error::DuplicateApiNames { .. })
    }

    /// Returns true if the error is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

fn render_listing(listing: &[String]) -> String {
    if listing.is_empty() {
        return "an empty directory".to_string();
    }
    format!("[{}]", listing.join(", "))
}

fn tensorflow_layout(neuron: &bool) -> &'static str {
    if *neuron {
        "<version>/saved_model.pb for each version (Neuron export)"
    } else {
        "<version>/saved_model.pb, <version>/variables/variables.index and <version>/variables/variables.data-00000-of-* for each version"
    }
}
