//! Upload validation for the ingestion endpoint.

use std::path::Path;

/// Exact client-facing messages returned by the ingestion endpoint.
pub const MISSING_FILE_MESSAGE: &str = "Entrada de arquivo ausente.";
pub const WRONG_TYPE_MESSAGE: &str = "Tipo de entrada inválido. Faça upload de um MP3";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{MISSING_FILE_MESSAGE}")]
    MissingFile,

    #[error("{WRONG_TYPE_MESSAGE}")]
    WrongType,
}

/// Validates uploaded filenames against the single accepted extension.
///
/// The comparison is case-sensitive and exact: `.MP3` is rejected, as is a
/// name with no extension at all.
pub struct UploadValidator {
    accepted_extension: &'static str,
}

impl UploadValidator {
    pub fn mp3() -> Self {
        UploadValidator {
            accepted_extension: "mp3",
        }
    }

    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(ValidationError::WrongType)?;

        if extension != self.accepted_extension {
            return Err(ValidationError::WrongType);
        }

        Ok(())
    }
}
