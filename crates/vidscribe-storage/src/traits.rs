use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncRead;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage filename: {0}")]
    InvalidFilename(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Result of a completed streaming upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Filename as stored on disk (with the collision-resistant token).
    pub filename: String,
    /// Resolved absolute path of the stored file.
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Destination for upload streams.
///
/// `upload_stream` is the key backpressure boundary: implementations must
/// write bytes incrementally as they arrive and never require the whole
/// payload in memory. Failure from either end of the pipe surfaces as a
/// single `StorageError` and must leave no open handles behind.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload_stream(
        &self,
        filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredFile>;

    async fn read(&self, filename: &str) -> StorageResult<Vec<u8>>;

    async fn exists(&self, filename: &str) -> StorageResult<bool>;

    async fn delete(&self, filename: &str) -> StorageResult<()>;
}
