//! Artifact metadata store.
//!
//! The ingestion pipeline only needs an append-only record keeper: one
//! `create` per successful upload, no updates or deletes. The store is
//! treated as an externally synchronized resource; callers do not hold locks
//! around it.

mod repository;

pub use repository::{
    ArtifactRepository, InMemoryArtifactStore, JsonlArtifactStore, PersistenceError,
};
