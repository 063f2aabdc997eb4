//! Error types module
//!
//! All errors in the ingestion pipeline are unified under the `AppError` enum,
//! which can represent validation, storage, persistence, conversion, and
//! transport failures. Each variant carries enough metadata to render an HTTP
//! response (status code, client-facing message) without the HTTP layer
//! inspecting error internals.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad or missing input from the caller. The message is the exact
    /// client-facing text returned in the error payload.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Metadata record write failed after (or independent of) a successful
    /// file write. The stored file is left in place.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Persistence(format!("JSON encoding error: {}", err))
    }
}

impl AppError {
    /// Get the error type name for logging
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Storage(_) => "Storage",
            AppError::Persistence(_) => "Persistence",
            AppError::Conversion(_) => "Conversion",
            AppError::Transport(_) => "Transport",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::Storage(_)
            | AppError::Persistence(_)
            | AppError::Conversion(_)
            | AppError::Transport(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => 500,
        }
    }

    /// Client-facing message (may differ from the internal error message)
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Storage(_) => "Falha ao gravar o arquivo.".to_string(),
            AppError::Persistence(_) => "Falha ao registrar o arquivo.".to_string(),
            AppError::Conversion(_) => "Falha na conversão.".to_string(),
            AppError::Transport(_) => "Falha de comunicação.".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Erro interno do servidor.".to_string()
            }
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) => LogLevel::Debug,
            AppError::Transport(_) => LogLevel::Warn,
            AppError::Storage(_)
            | AppError::Persistence(_)
            | AppError::Conversion(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => LogLevel::Error,
        }
    }

    /// Detailed message including the source chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }
        details
    }
}
