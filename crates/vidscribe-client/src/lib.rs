//! Client side of the ingestion pipeline.
//!
//! Provides the HTTP client for the ingestion API and the submission state
//! machine that sequences local conversion, upload, and the transcription
//! request behind a single observable status value.

pub mod api;
pub mod submission;

pub use api::{ApiClient, UploadedVideo};
pub use submission::{AudioConverter, IngestGateway, LocalConverter, Submission, SubmissionStatus};
