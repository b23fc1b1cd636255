//! Storage access for model resolution
//!
//! This crate provides a single capability set, [`StorageBackend`], over the
//! two places models live: the local filesystem and object storage.

pub mod backend;
pub mod filesystem;
pub mod memory;
pub mod remote;
pub mod s3path;
#[cfg(feature = "s3")]
pub mod s3;

// Re-export commonly used types
pub use backend::{BackendKind, StorageBackend};
pub use filesystem::FilesystemAdapter;
pub use memory::InMemoryObjectStore;
pub use remote::{ObjectListing, ObjectStoreClient, RemoteBackend};
#[cfg(feature = "s3")]
pub use s3::S3ObjectClient;
