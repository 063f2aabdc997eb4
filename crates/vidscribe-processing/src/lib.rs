//! Local media processing: audio extraction and upload validation.

pub mod transcoder;
pub mod validator;

pub use transcoder::{transcoder, AudioFile, ConversionError, Transcoder};
pub use validator::{UploadValidator, ValidationError};
