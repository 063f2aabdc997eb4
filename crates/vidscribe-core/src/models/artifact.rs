use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A durably stored audio payload plus its metadata record.
///
/// Created exactly once per successful ingestion and immutable thereafter.
/// `path` is unique across all artifacts even when two uploads share the same
/// `name`: the stored filename carries a random token generated at upload
/// time, so uniqueness is structural rather than enforced by locking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub id: Uuid,
    /// Original filename as sent by the uploader.
    pub name: String,
    /// Resolved absolute filesystem location of the stored payload.
    pub path: String,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Artifact {
            id: Uuid::new_v4(),
            name: name.into(),
            path: path.into(),
            created_at: Utc::now(),
        }
    }
}

/// Success envelope for the ingestion endpoint: `{ "video": { ... } }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoEnvelope {
    pub video: Artifact,
}

impl From<Artifact> for VideoEnvelope {
    fn from(video: Artifact) -> Self {
        VideoEnvelope { video }
    }
}
