//! Configuration module
//!
//! Environment-driven configuration for the ingestion server and the client
//! pipeline. Values fall back to development defaults so `cargo run` works
//! without a `.env` file.

use std::env;
use std::path::PathBuf;

const DEFAULT_SERVER_PORT: u16 = 3333;
const DEFAULT_UPLOAD_DIR: &str = "tmp";
// Ceiling applies to the uploaded (post-conversion) audio payload.
const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
const DEFAULT_ARTIFACT_DB_PATH: &str = "tmp/artifacts.jsonl";
const DEFAULT_API_URL: &str = "http://localhost:3333";

#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    upload_dir: PathBuf,
    max_upload_size_bytes: usize,
    ffmpeg_path: String,
    artifact_db_path: PathBuf,
    api_url: String,
}

impl Config {
    pub fn new(
        server_port: u16,
        upload_dir: impl Into<PathBuf>,
        max_upload_size_bytes: usize,
        ffmpeg_path: impl Into<String>,
        artifact_db_path: impl Into<PathBuf>,
        api_url: impl Into<String>,
    ) -> Self {
        Config {
            server_port,
            upload_dir: upload_dir.into(),
            max_upload_size_bytes,
            ffmpeg_path: ffmpeg_path.into(),
            artifact_db_path: artifact_db_path.into(),
            api_url: api_url.into(),
        }
    }

    /// Load configuration from the environment.
    ///
    /// Callers (binaries) are expected to run `dotenvy::dotenv().ok()` first
    /// if they want `.env` support.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let server_port = match env::var("SERVER_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT '{}': {}", v, e))?,
            Err(_) => DEFAULT_SERVER_PORT,
        };

        let max_upload_size_bytes = match env::var("MAX_UPLOAD_SIZE_BYTES") {
            Ok(v) => v
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_SIZE_BYTES '{}': {}", v, e))?,
            Err(_) => DEFAULT_MAX_UPLOAD_SIZE_BYTES,
        };

        Ok(Config {
            server_port,
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            max_upload_size_bytes,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| DEFAULT_FFMPEG_PATH.to_string()),
            artifact_db_path: env::var("ARTIFACT_DB_PATH")
                .unwrap_or_else(|_| DEFAULT_ARTIFACT_DB_PATH.to_string())
                .into(),
            api_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        })
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub fn artifact_db_path(&self) -> &PathBuf {
        &self.artifact_db_path
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
