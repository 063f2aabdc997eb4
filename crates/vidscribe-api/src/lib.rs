//! Ingestion API library.
//!
//! HTTP handlers, error rendering, and application setup for the audio
//! ingestion server.

mod handlers;
pub mod setup;
pub mod telemetry;

pub mod error;
pub mod state;

pub use error::ErrorResponse;
