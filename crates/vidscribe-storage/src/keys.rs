//! Collision-resistant upload filename generation.
//!
//! Format: `{original_base_name}-{uuid_v4}{extension}`. The random token
//! makes concurrent uploads with identical original names land on distinct
//! paths without any cross-request coordination.

use std::path::Path;
use uuid::Uuid;

/// Derive the on-disk filename for an uploaded file.
///
/// The extension (including the dot) is stripped from the original name,
/// a freshly generated UUID is appended, and the extension is restored:
/// `audio.mp3` becomes `audio-3f1a...c9.mp3`. A name without an extension
/// gets the token appended with no suffix.
pub fn upload_filename(original: &str) -> String {
    let path = Path::new(original);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original);

    format!("{}-{}{}", base, Uuid::new_v4(), extension)
}
