//! Duplicate name detection for models and APIs

use std::collections::{HashMap, HashSet};

use common::error::{Error, Result};
use common::models::{ApiDeclaration, CuratedModelResource, ModelResource};

/// Fails on the first model name that appears twice
pub fn check_duplicate_models(models: &[CuratedModelResource]) -> Result<()> {
    let mut seen = HashSet::with_capacity(models.len());
    for model in models {
        if !seen.insert(model.name.as_str()) {
            return Err(Error::DuplicateModelNames(model.name.clone()));
        }
    }
    Ok(())
}

/// Returns the first group of APIs sharing a name, if any
///
/// Groups are ordered by the first appearance of their name, and members keep
/// their declaration order.
pub fn find_duplicate_apis(apis: &[ApiDeclaration]) -> Option<Vec<&ApiDeclaration>> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ApiDeclaration>> = HashMap::new();

    for api in apis {
        let group = groups.entry(api.name.as_str()).or_insert_with(|| {
            order.push(api.name.as_str());
            Vec::new()
        });
        group.push(api);
    }

    order
        .into_iter()
        .find_map(|name| groups.remove(name).filter(|group| group.len() > 1))
}

/// Returns true if any model carries the name
pub fn is_model_name_in(models: &[ModelResource], name: &str) -> bool {
    models.iter().any(|model| model.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::PredictorType;

    fn curated(names: &[&str]) -> Vec<CuratedModelResource> {
        names
            .iter()
            .map(|name| CuratedModelResource {
                name: name.to_string(),
                model_path: format!("/models/{}/", name),
                signature_key: None,
                is_remote: false,
            })
            .collect()
    }

    #[test]
    fn test_duplicate_model_names() {
        let err = check_duplicate_models(&curated(&["a", "b", "a"])).unwrap_err();
        assert!(matches!(err, Error::DuplicateModelNames(ref name) if name == "a"));

        assert!(check_duplicate_models(&curated(&["a", "b", "c"])).is_ok());
        assert!(check_duplicate_models(&[]).is_ok());
    }

    #[test]
    fn test_first_duplicate_is_reported() {
        let err = check_duplicate_models(&curated(&["x", "y", "y", "x"])).unwrap_err();
        assert!(matches!(err, Error::DuplicateModelNames(ref name) if name == "y"));
    }

    #[test]
    fn test_duplicate_apis_in_first_seen_order() {
        let apis = vec![
            ApiDeclaration::new("text", PredictorType::Python),
            ApiDeclaration::new("image", PredictorType::Onnx),
            ApiDeclaration::new("image", PredictorType::TensorFlow),
            ApiDeclaration::new("text", PredictorType::TensorFlow),
            ApiDeclaration::new("text", PredictorType::Onnx),
        ];

        let group = find_duplicate_apis(&apis).unwrap();
        assert_eq!(group.len(), 3);
        assert!(group.iter().all(|api| api.name == "text"));
        assert_eq!(group[0].predictor_type, PredictorType::Python);
        assert_eq!(group[2].predictor_type, PredictorType::Onnx);
    }

    #[test]
    fn test_no_duplicate_apis() {
        let apis = vec![
            ApiDeclaration::new("text", PredictorType::Python),
            ApiDeclaration::new("image", PredictorType::Onnx),
        ];
        assert!(find_duplicate_apis(&apis).is_none());
        assert!(find_duplicate_apis(&[]).is_none());
    }

    #[test]
    fn test_model_name_lookup() {
        let models = vec![ModelResource::new("mnist", "s3://b/mnist"), ModelResource::new("iris", "iris/")];
        assert!(is_model_name_in(&models, "iris"));
        assert!(!is_model_name_in(&models, "resnet"));
    }
}
