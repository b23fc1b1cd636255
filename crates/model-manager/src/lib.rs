//! Model path resolution and validation
//!
//! This crate turns model declarations into validated, versioned models:
//! paths are resolved and normalized, model folders are discovered, and every
//! version directory is checked against the layout its predictor expects.

pub mod curator;
pub mod discovery;
pub mod duplicates;
pub mod manager;
pub mod resolver;
pub mod versioning;

// Re-export commonly used types
pub use curator::curate;
pub use discovery::discover;
pub use duplicates::{check_duplicate_models, find_duplicate_apis, is_model_name_in};
pub use manager::ModelManager;
pub use resolver::resolve;
pub use versioning::{LayoutPolicy, VersionedLayoutValidator};
