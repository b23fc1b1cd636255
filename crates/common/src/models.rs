//! Common data models for the model resolver
//!
//! This module defines the model declarations handed to the resolver and the
//! resolved models it hands back to the orchestration layer.

use serde::{Deserialize, Serialize};

use crate::types::{PredictorType, Version};

/// A model as declared by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResource {
    /// Model name, unique within an API
    pub name: String,
    /// Object storage URI or filesystem path of the model
    pub model_path: String,
    /// Signature key to serve (TensorFlow only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_key: Option<String>,
}

impl ModelResource {
    /// Creates a new model resource without a signature key
    pub fn new(name: impl Into<String>, model_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_path: model_path.into(),
            signature_key: None,
        }
    }
}

/// A model declaration after path normalization and backend tagging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedModelResource {
    /// Model name
    pub name: String,
    /// Resolved model path (absolute path or object storage URI)
    pub model_path: String,
    /// Signature key to serve (TensorFlow only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_key: Option<String>,
    /// Whether the model lives in object storage
    pub is_remote: bool,
}

impl CuratedModelResource {
    /// Returns true if the model is a single file rather than a directory
    pub fn is_single_file(&self) -> bool {
        !self.model_path.ends_with('/')
    }
}

/// An API declaration as far as model resolution is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDeclaration {
    /// API name
    pub name: String,
    /// Predictor the API serves with
    pub predictor_type: PredictorType,
    /// Explicitly declared models
    #[serde(default)]
    pub models: Vec<ModelResource>,
    /// Directory holding one model per child, used when `models` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_dir: Option<String>,
    /// Whether the models are exported for Inferentia (Neuron) accelerators
    #[serde(default)]
    pub neuron: bool,
}

impl ApiDeclaration {
    /// Creates a new API declaration with no models
    pub fn new(name: impl Into<String>, predictor_type: PredictorType) -> Self {
        Self {
            name: name.into(),
            predictor_type,
            models: Vec::new(),
            models_dir: None,
            neuron: false,
        }
    }

    /// Adds an explicitly declared model
    pub fn with_model(mut self, model: ModelResource) -> Self {
        self.models.push(model);
        self
    }

    /// Sets the models directory
    pub fn with_models_dir(mut self, models_dir: impl Into<String>) -> Self {
        self.models_dir = Some(models_dir.into());
        self
    }

    /// Marks the API as serving Neuron exports
    pub fn with_neuron(mut self, neuron: bool) -> Self {
        self.neuron = neuron;
        self
    }
}

/// A model that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModel {
    /// The curated declaration
    #[serde(flatten)]
    pub resource: CuratedModelResource,
    /// Versions found under the model path, absent for unversioned models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<Version>>,
}

impl ResolvedModel {
    /// Returns the model name
    pub fn name(&self) -> &str {
        &self.resource.name
    }

    /// Returns true if the model was resolved with versions
    pub fn is_versioned(&self) -> bool {
        self.versions.is_some()
    }
}

/// All models resolved for one API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedApi {
    /// API name
    pub name: String,
    /// Predictor the API serves with
    pub predictor_type: PredictorType,
    /// Resolved models, in declaration order
    pub models: Vec<ResolvedModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_detection() {
        let mut curated = CuratedModelResource {
            name: "iris".to_string(),
            model_path: "s3://bucket/iris.onnx".to_string(),
            signature_key: None,
            is_remote: true,
        };
        assert!(curated.is_single_file());

        curated.model_path = "s3://bucket/iris/".to_string();
        assert!(!curated.is_single_file());
    }

    #[test]
    fn test_api_declaration_deserializes_with_defaults() {
        let api: ApiDeclaration = serde_json::from_str(
            r#"{"name": "classifier", "predictor_type": "onnx", "models_dir": "models/"}"#,
        )
        .unwrap();

        assert_eq!(api.predictor_type, PredictorType::Onnx);
        assert!(api.models.is_empty());
        assert_eq!(api.models_dir.as_deref(), Some("models/"));
        assert!(!api.neuron);
    }

    #[test]
    fn test_resolved_model_serializes_flat() {
        let model = ResolvedModel {
            resource: CuratedModelResource {
                name: "mnist".to_string(),
                model_path: "/data/mnist/".to_string(),
                signature_key: None,
                is_remote: false,
            },
            versions: Some(vec![1, 2]),
        };

        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["name"], "mnist");
        assert_eq!(value["is_remote"], false);
        assert_eq!(value["versions"], serde_json::json!([1, 2]));
    }
}
