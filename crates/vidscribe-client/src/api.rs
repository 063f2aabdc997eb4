//! HTTP client for the ingestion API.
//!
//! Minimal reqwest-based client: one multipart upload call and one JSON call
//! to request transcription of an uploaded artifact.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use vidscribe_processing::AudioFile;

/// Server-side record of an uploaded audio payload, as returned by the
/// ingestion endpoint's `video` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedVideo {
    pub id: String,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
struct VideoEnvelope {
    video: UploadedVideo,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(serde::Serialize)]
struct TranscriptionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
}

/// HTTP client for the ingestion API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Extract the server's error message from a failed response, falling
    /// back to the raw body text when it is not the expected JSON shape.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) => format!("status {}: {}", status, body),
        }
    }

    /// Upload a converted audio payload via multipart POST.
    pub async fn upload_audio(&self, audio: &AudioFile) -> Result<UploadedVideo> {
        let part = reqwest::multipart::Part::bytes(audio.data.clone())
            .file_name(audio.name.clone())
            .mime_str(&audio.content_type)
            .context("Invalid audio content type")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.build_url("/videos"))
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Upload rejected: {}",
                Self::error_message(response).await
            ));
        }

        let envelope: VideoEnvelope = response
            .json()
            .await
            .context("Failed to parse upload response")?;

        Ok(envelope.video)
    }

    /// Ask the server to transcribe an uploaded artifact. Acceptance is
    /// asynchronous; the transcript becomes available elsewhere.
    pub async fn request_transcription(&self, video_id: &str, prompt: Option<&str>) -> Result<()> {
        let response = self
            .client
            .post(self.build_url(&format!("/videos/{}/transcription", video_id)))
            .json(&TranscriptionRequest { prompt })
            .send()
            .await
            .context("Failed to send transcription request")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Transcription request rejected: {}",
                Self::error_message(response).await
            ));
        }

        Ok(())
    }
}
