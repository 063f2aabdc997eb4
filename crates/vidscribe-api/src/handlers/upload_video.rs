use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use vidscribe_core::models::VideoEnvelope;
use vidscribe_core::AppError;
use vidscribe_processing::ValidationError;
use vidscribe_storage::upload_filename;

/// Ingest one audio payload.
///
/// The first file field in the multipart body is validated and piped to
/// storage as its bytes arrive; the payload is never buffered whole in
/// memory. Non-file fields are skipped. Validation happens before any byte
/// is written, so a rejected upload leaves no file behind.
///
/// The metadata record write is not transactional with the file write: if it
/// fails the stored file stays on disk and the request returns 500.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<VideoEnvelope>, HttpAppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        state.validator.validate_filename(&original_name)?;

        let stored_name = upload_filename(&original_name);

        let body = field.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let reader = StreamReader::new(body);
        futures::pin_mut!(reader);

        let stored = state
            .storage
            .upload_stream(&stored_name, &mut reader)
            .await?;

        tracing::info!(
            original_name = %original_name,
            stored_name = %stored_name,
            size_bytes = stored.size_bytes,
            "Upload stream completed"
        );

        let artifact = state
            .artifacts
            .create(&original_name, &stored.path.display().to_string())
            .await?;

        return Ok(Json(VideoEnvelope::from(artifact)));
    }

    Err(ValidationError::MissingFile.into())
}
