//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p vidscribe-api --test upload_test` or
//! `cargo test -p vidscribe-api`.

use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;
use vidscribe_api::setup::routes;
use vidscribe_api::state::AppState;
use vidscribe_core::Config;
use vidscribe_db::InMemoryArtifactStore;
use vidscribe_processing::UploadValidator;
use vidscribe_storage::LocalStorage;

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub artifacts: Arc<InMemoryArtifactStore>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of files currently stored in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .expect("Failed to read upload directory")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Setup test app with isolated local storage and an in-memory metadata store.
pub async fn setup_test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let storage = LocalStorage::new(upload_dir.path())
        .await
        .expect("Failed to create local storage");

    let artifacts = Arc::new(InMemoryArtifactStore::new());

    let config = Config::new(
        0,
        upload_dir.path(),
        25 * 1024 * 1024,
        "ffmpeg",
        upload_dir.path().join("artifacts.jsonl"),
        "http://localhost:3333",
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        storage: Arc::new(storage),
        artifacts: artifacts.clone(),
        validator: UploadValidator::mp3(),
    });

    let router = routes::setup_routes(&config, state);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        artifacts,
        upload_dir,
    }
}
