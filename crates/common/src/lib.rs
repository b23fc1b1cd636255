//! Common utilities and types for the model resolver
//! 
//! This crate provides shared functionality used across the resolver crates,
//! including error types, model declarations, predictor types and helper functions.

pub mod error;
pub mod models;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{Error, Result};
pub use models::*;
pub use types::*;
