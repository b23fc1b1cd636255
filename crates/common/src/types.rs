//! Common types for the model resolver
//!
//! This module defines the predictor and framework enumerations shared by
//! every stage of model resolution.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Model version identifier, usually a timestamp
pub type Version = u64;

/// Serving framework a model is deployed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorType {
    /// TensorFlow Serving (SavedModel exports)
    TensorFlow,
    /// ONNX runtime
    Onnx,
    /// Arbitrary Python predictor
    Python,
}

impl PredictorType {
    /// Returns true if models for this predictor must always be versioned
    pub fn requires_versions(&self) -> bool {
        matches!(self, PredictorType::TensorFlow)
    }
}

impl fmt::Display for PredictorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictorType::TensorFlow => write!(f, "tensorflow"),
            PredictorType::Onnx => write!(f, "onnx"),
            PredictorType::Python => write!(f, "python"),
        }
    }
}

impl FromStr for PredictorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tensorflow" | "tf" => Ok(PredictorType::TensorFlow),
            "onnx" => Ok(PredictorType::Onnx),
            "python" => Ok(PredictorType::Python),
            _ => Err(format!("Unknown predictor type: {}", s)),
        }
    }
}

/// Framework named in diagnostics
///
/// Unlike [`PredictorType`] this distinguishes nothing about hardware
/// acceleration; it only selects the wording of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framework {
    /// TensorFlow (standard or Neuron export)
    TensorFlow,
    /// ONNX
    Onnx,
    /// Python
    Python,
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framework::TensorFlow => write!(f, "TensorFlow"),
            Framework::Onnx => write!(f, "ONNX"),
            Framework::Python => write!(f, "Python"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_type_from_str() {
        assert_eq!("TensorFlow".parse::<PredictorType>().unwrap(), PredictorType::TensorFlow);
        assert_eq!("tf".parse::<PredictorType>().unwrap(), PredictorType::TensorFlow);
        assert_eq!("ONNX".parse::<PredictorType>().unwrap(), PredictorType::Onnx);
        assert_eq!("python".parse::<PredictorType>().unwrap(), PredictorType::Python);
        assert!("pytorch".parse::<PredictorType>().is_err());
    }

    #[test]
    fn test_predictor_type_display_round_trips() {
        for predictor_type in [PredictorType::TensorFlow, PredictorType::Onnx, PredictorType::Python] {
            assert_eq!(predictor_type.to_string().parse::<PredictorType>().unwrap(), predictor_type);
        }
    }

    #[test]
    fn test_only_tensorflow_requires_versions() {
        assert!(PredictorType::TensorFlow.requires_versions());
        assert!(!PredictorType::Onnx.requires_versions());
        assert!(!PredictorType::Python.requires_versions());
    }
}
