//! Transcoder - local video-to-audio extraction.
//!
//! Wraps an ffmpeg binary behind a process-wide cached handle. Each
//! conversion runs in a private temporary directory: the input buffer is
//! written as `input.mp4`, ffmpeg extracts the audio track at a low fixed
//! bitrate tuned for speech transcription, and `output.mp3` is read back into
//! memory. The directory is released on every exit path.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::OnceCell;

const INPUT_NAME: &str = "input.mp4";
const OUTPUT_NAME: &str = "output.mp3";
const AUDIO_BITRATE: &str = "20k";
const AUDIO_CODEC: &str = "libmp3lame";

/// Canonical name and content type of every conversion result. Callers never
/// need the original video filename for the produced audio.
pub const AUDIO_FILE_NAME: &str = "audio.mp3";
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Transcoding engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Failed to write conversion input: {0}")]
    WriteInput(#[source] std::io::Error),

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Failed to read conversion output: {0}")]
    ReadOutput(#[source] std::io::Error),

    #[error("Conversion produced no audio data")]
    EmptyOutput,
}

/// In-memory audio payload produced by a conversion.
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub data: Vec<u8>,
    pub name: String,
    pub content_type: String,
}

impl AudioFile {
    fn new(data: Vec<u8>) -> Self {
        AudioFile {
            data,
            name: AUDIO_FILE_NAME.to_string(),
            content_type: AUDIO_CONTENT_TYPE.to_string(),
        }
    }
}

/// Handle to a verified ffmpeg binary. Stateless per invocation.
pub struct Transcoder {
    ffmpeg_path: String,
}

static TRANSCODER: OnceCell<Transcoder> = OnceCell::const_new();

/// Scoped accessor for the process-wide transcoder.
///
/// The binary is resolved and verified on first use and reused for every
/// later conversion; the handle's lifetime is not tied to any caller.
pub async fn transcoder(ffmpeg_path: &str) -> Result<&'static Transcoder, ConversionError> {
    TRANSCODER
        .get_or_try_init(|| Transcoder::resolve(ffmpeg_path.to_string()))
        .await
}

impl Transcoder {
    /// Verify the binary answers `-version` before accepting it.
    async fn resolve(ffmpeg_path: String) -> Result<Self, ConversionError> {
        let output = Command::new(&ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ConversionError::EngineUnavailable(format!("{}: {}", ffmpeg_path, e))
            })?;

        if !output.status.success() {
            return Err(ConversionError::EngineUnavailable(format!(
                "{} exited with {}",
                ffmpeg_path, output.status
            )));
        }

        tracing::info!(ffmpeg_path = %ffmpeg_path, "Transcoding engine initialized");
        Ok(Transcoder { ffmpeg_path })
    }

    /// Extract the audio track from an in-memory video buffer.
    ///
    /// Runs entirely locally; no partial output is returned on failure.
    #[tracing::instrument(skip(self, video_bytes), fields(input_bytes = video_bytes.len()))]
    pub async fn convert(&self, video_bytes: &[u8]) -> Result<AudioFile, ConversionError> {
        let start = std::time::Instant::now();

        // Private ephemeral workspace; removed when `workdir` drops.
        let workdir = tempfile::tempdir().map_err(ConversionError::WriteInput)?;
        let input_path = workdir.path().join(INPUT_NAME);
        let output_path = workdir.path().join(OUTPUT_NAME);

        tokio::fs::write(&input_path, video_bytes)
            .await
            .map_err(ConversionError::WriteInput)?;

        let output = Command::new(&self.ffmpeg_path)
            .args(conversion_args(&input_path, &output_path))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ConversionError::ExtractionFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::ExtractionFailed(
                stderr.lines().last().unwrap_or("unknown error").to_string(),
            ));
        }

        let data = tokio::fs::read(&output_path)
            .await
            .map_err(ConversionError::ReadOutput)?;

        if data.is_empty() {
            return Err(ConversionError::EmptyOutput);
        }

        tracing::info!(
            output_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Conversion finished"
        );

        Ok(AudioFile::new(data))
    }
}

/// Fixed argument set: audio-only extraction, fixed codec, low bitrate.
fn conversion_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-map".to_string(),
        "0:a".to_string(),
        "-b:a".to_string(),
        AUDIO_BITRATE.to_string(),
        "-acodec".to_string(),
        AUDIO_CODEC.to_string(),
        output.to_string_lossy().to_string(),
    ]
}
