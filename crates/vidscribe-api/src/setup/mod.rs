//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vidscribe_core::Config;
use vidscribe_db::JsonlArtifactStore;
use vidscribe_processing::UploadValidator;
use vidscribe_storage::LocalStorage;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Setup storage
    let storage = LocalStorage::new(config.upload_dir())
        .await
        .context("Failed to initialize upload storage")?;

    // Setup the metadata store
    let artifacts = JsonlArtifactStore::new(config.artifact_db_path())
        .await
        .context("Failed to initialize artifact store")?;

    let state = Arc::new(AppState {
        config: config.clone(),
        storage: Arc::new(storage),
        artifacts: Arc::new(artifacts),
        validator: UploadValidator::mp3(),
    });

    // Setup routes
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
