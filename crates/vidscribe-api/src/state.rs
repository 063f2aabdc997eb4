use std::sync::Arc;
use vidscribe_core::Config;
use vidscribe_db::ArtifactRepository;
use vidscribe_processing::UploadValidator;
use vidscribe_storage::Storage;

/// Shared application state for all handlers.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub artifacts: Arc<dyn ArtifactRepository>,
    pub validator: UploadValidator,
}
