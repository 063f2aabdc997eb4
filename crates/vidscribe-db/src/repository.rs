use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use vidscribe_core::models::Artifact;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to write artifact record: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to encode artifact record: {0}")]
    EncodeFailed(#[source] serde_json::Error),
}

/// Append-only record keeper mapping an artifact id to its storage location
/// and display name. Create returns the record with its assigned id; no
/// update or delete is consumed by this pipeline.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn create(&self, name: &str, path: &str) -> Result<Artifact, PersistenceError>;
}

/// Durable store: one JSON record per line, appended on create.
pub struct JsonlArtifactStore {
    db_path: PathBuf,
    // Serializes appends from concurrent requests so records never interleave.
    write_lock: Mutex<()>,
}

impl JsonlArtifactStore {
    pub async fn new(db_path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(PersistenceError::WriteFailed)?;
        }

        Ok(JsonlArtifactStore {
            db_path,
            write_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl ArtifactRepository for JsonlArtifactStore {
    async fn create(&self, name: &str, path: &str) -> Result<Artifact, PersistenceError> {
        let artifact = Artifact::new(name, path);

        let mut line =
            serde_json::to_string(&artifact).map_err(PersistenceError::EncodeFailed)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.db_path)
            .await
            .map_err(PersistenceError::WriteFailed)?;
        file.write_all(line.as_bytes())
            .await
            .map_err(PersistenceError::WriteFailed)?;
        file.sync_all()
            .await
            .map_err(PersistenceError::WriteFailed)?;

        tracing::debug!(artifact_id = %artifact.id, name = %artifact.name, "Artifact record created");

        Ok(artifact)
    }
}

/// In-memory store for tests and for exercising failure paths.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    records: Mutex<Vec<Artifact>>,
    fail_next: std::sync::atomic::AtomicBool,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next create fail with a write error.
    pub fn fail_next_create(&self) {
        self.fail_next
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub async fn records(&self) -> Vec<Artifact> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactStore {
    async fn create(&self, name: &str, path: &str) -> Result<Artifact, PersistenceError> {
        if self.fail_next.swap(false, std::sync::atomic::Ordering::SeqCst) {
            return Err(PersistenceError::WriteFailed(std::io::Error::new(
                std::io::ErrorKind::Other,
                "metadata store unavailable",
            )));
        }

        let artifact = Artifact::new(name, path);
        self.records.lock().await.push(artifact.clone());
        Ok(artifact)
    }
}
