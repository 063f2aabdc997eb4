use crate::traits::{Storage, StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Upload directory (e.g., "tmp"); created if missing and
    ///   resolved to an absolute path so stored artifact paths are stable.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let base_path = base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize upload directory: {}", e))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Resolve a stored filename to an absolute path under the base directory.
    ///
    /// Rejects names that could escape the upload directory. Generated
    /// filenames never contain separators, so a rejection here means the
    /// caller passed through an unsanitized name.
    fn resolve(&self, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        Ok(self.base_path.join(filename))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    /// Pipe an upload stream to disk.
    ///
    /// Bytes are copied incrementally; the payload is never buffered whole in
    /// memory. On any failure (read side or write side) the partially written
    /// file is removed, so after a mid-stream disconnect the directory holds
    /// either no file or a complete one. Handles are released on every exit
    /// path (RAII on `File`).
    async fn upload_stream(
        &self,
        filename: &str,
        mut reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredFile> {
        let path = self.resolve(filename)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let copied = tokio::io::copy(&mut reader, &mut file).await;

        let size_bytes = match copied {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                if let Err(cleanup_err) = fs::remove_file(&path).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        path = %path.display(),
                        "Failed to remove partial file after stream error"
                    );
                }
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write stream to file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(StoredFile {
            filename: filename.to_string(),
            path,
            size_bytes,
        })
    }

    async fn read(&self, filename: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(filename)?;

        if !try_exists(&path).await {
            return Err(StorageError::NotFound(filename.to_string()));
        }

        fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    async fn exists(&self, filename: &str) -> StorageResult<bool> {
        let path = self.resolve(filename)?;
        Ok(try_exists(&path).await)
    }

    async fn delete(&self, filename: &str) -> StorageResult<()> {
        let path = self.resolve(filename)?;

        if !try_exists(&path).await {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })
    }
}

async fn try_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::upload_filename;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stream_upload_round_trip() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = b"mp3 payload bytes".to_vec();
        let stored = storage
            .upload_stream("audio-test.mp3", &mut Cursor::new(data.clone()))
            .await
            .unwrap();

        assert_eq!(stored.size_bytes, data.len() as u64);
        assert!(stored.path.is_absolute());

        let read_back = storage.read("audio-test.mp3").await.unwrap();
        assert_eq!(read_back, data);
    }

    #[tokio::test]
    async fn test_same_original_name_distinct_paths() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let first = storage
            .upload_stream(
                &upload_filename("audio.mp3"),
                &mut Cursor::new(b"one".to_vec()),
            )
            .await
            .unwrap();
        let second = storage
            .upload_stream(
                &upload_filename("audio.mp3"),
                &mut Cursor::new(b"two".to_vec()),
            )
            .await
            .unwrap();

        assert_ne!(first.path, second.path);
        assert!(storage.exists(&first.filename).await.unwrap());
        assert!(storage.exists(&second.filename).await.unwrap());
    }

    #[tokio::test]
    async fn test_stream_error_removes_partial_file() {
        struct FailingReader {
            sent: bool,
        }

        impl AsyncRead for FailingReader {
            fn poll_read(
                mut self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
                buf: &mut tokio::io::ReadBuf<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                if !self.sent {
                    self.sent = true;
                    buf.put_slice(b"partial data");
                    std::task::Poll::Ready(Ok(()))
                } else {
                    std::task::Poll::Ready(Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "client disconnected",
                    )))
                }
            }
        }

        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage
            .upload_stream("audio-broken.mp3", &mut FailingReader { sent: false })
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!storage.exists("audio-broken.mp3").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.read("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidFilename(_))));

        let result = storage.delete("sub/dir.mp3").await;
        assert!(matches!(result, Err(StorageError::InvalidFilename(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        assert!(storage.delete("nonexistent.mp3").await.is_ok());
    }
}
