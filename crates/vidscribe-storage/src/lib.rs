//! Filesystem storage for ingested audio payloads.
//!
//! The ingestion endpoint pipes untrusted upload streams into files named
//! with a collision-resistant token, so concurrent uploads never overwrite
//! each other regardless of their original filenames.

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::upload_filename;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredFile};
