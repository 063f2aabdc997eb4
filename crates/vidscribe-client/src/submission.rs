//! Submission state machine.
//!
//! One `Submission` per user action: select a video, submit, watch the status
//! move through `Idle → Converting → Uploading → Transcribing → Succeeded`.
//! Any stage failure collapses to the absorbing `Failed` status with no stage
//! detail exposed beyond that binary outcome. A submission is discarded after
//! it settles, never reset.

use crate::api::{ApiClient, UploadedVideo};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use vidscribe_processing::{transcoder, AudioFile};

/// Observable pipeline status. Exactly one value at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Converting,
    Uploading,
    Transcribing,
    Succeeded,
    Failed,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Succeeded | SubmissionStatus::Failed)
    }
}

impl fmt::Display for SubmissionStatus {
    /// User-visible status labels.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionStatus::Idle => "Esperando",
            SubmissionStatus::Converting => "Convertendo",
            SubmissionStatus::Uploading => "Carregando",
            SubmissionStatus::Transcribing => "Transcrevendo",
            SubmissionStatus::Succeeded => "Sucesso",
            SubmissionStatus::Failed => "Falha",
        };
        f.write_str(label)
    }
}

/// Allowed edges of the state machine. `Failed` absorbs from any
/// non-terminal state; everything else is strictly sequential.
fn is_allowed_transition(from: SubmissionStatus, to: SubmissionStatus) -> bool {
    use SubmissionStatus::*;
    match (from, to) {
        (Idle, Converting)
        | (Converting, Uploading)
        | (Uploading, Transcribing)
        | (Transcribing, Succeeded) => true,
        (from, Failed) => !from.is_terminal(),
        _ => false,
    }
}

/// Local conversion stage.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn convert(&self, video_bytes: &[u8]) -> anyhow::Result<AudioFile>;
}

/// Converter backed by the process-wide transcoding engine.
pub struct LocalConverter {
    ffmpeg_path: String,
}

impl LocalConverter {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        LocalConverter {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

#[async_trait]
impl AudioConverter for LocalConverter {
    async fn convert(&self, video_bytes: &[u8]) -> anyhow::Result<AudioFile> {
        let engine = transcoder(&self.ffmpeg_path).await?;
        Ok(engine.convert(video_bytes).await?)
    }
}

/// Upload and transcription-request stages.
#[async_trait]
pub trait IngestGateway: Send + Sync {
    async fn upload_audio(&self, audio: &AudioFile) -> anyhow::Result<UploadedVideo>;

    async fn request_transcription(&self, video_id: &str, prompt: Option<&str>)
        -> anyhow::Result<()>;
}

#[async_trait]
impl IngestGateway for ApiClient {
    async fn upload_audio(&self, audio: &AudioFile) -> anyhow::Result<UploadedVideo> {
        ApiClient::upload_audio(self, audio).await
    }

    async fn request_transcription(
        &self,
        video_id: &str,
        prompt: Option<&str>,
    ) -> anyhow::Result<()> {
        ApiClient::request_transcription(self, video_id, prompt).await
    }
}

/// The selected input video, held in memory until conversion.
struct SelectedVideo {
    name: String,
    data: Vec<u8>,
}

/// Drives one submission through the pipeline.
pub struct Submission {
    converter: Arc<dyn AudioConverter>,
    gateway: Arc<dyn IngestGateway>,
    video: Option<SelectedVideo>,
    artifact_id: Option<String>,
    status_tx: watch::Sender<SubmissionStatus>,
    on_completed: Option<Box<dyn FnOnce(&str) + Send>>,
}

impl Submission {
    pub fn new(converter: Arc<dyn AudioConverter>, gateway: Arc<dyn IngestGateway>) -> Self {
        let (status_tx, _) = watch::channel(SubmissionStatus::Idle);
        Submission {
            converter,
            gateway,
            video: None,
            artifact_id: None,
            status_tx,
            on_completed: None,
        }
    }

    /// Select the video to submit. Replaces any earlier selection.
    pub fn select_video(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.video = Some(SelectedVideo {
            name: name.into(),
            data,
        });
    }

    /// Register the completion callback. Fires exactly once, with the
    /// artifact id, when the submission reaches `Succeeded`; never on
    /// `Failed`.
    pub fn on_completed(&mut self, callback: impl FnOnce(&str) + Send + 'static) {
        self.on_completed = Some(Box::new(callback));
    }

    /// Watch the observable status.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> SubmissionStatus {
        *self.status_tx.borrow()
    }

    /// Id of the ingested artifact, available once the upload stage settles.
    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    /// Apply one transition; rejected edges leave the status untouched.
    fn transition(&self, to: SubmissionStatus) -> bool {
        let from = *self.status_tx.borrow();
        if !is_allowed_transition(from, to) {
            tracing::debug!(%from, %to, "Rejected status transition");
            return false;
        }
        self.status_tx.send_replace(to);
        true
    }

    fn fail(&self) {
        self.transition(SubmissionStatus::Failed);
    }

    /// Run the pipeline to a terminal status.
    ///
    /// A no-op when no video is selected or when a run has already started on
    /// this instance (cooperative single-flight; re-submission needs a new
    /// `Submission`). Each stage is awaited before the next begins.
    pub async fn submit(&mut self, prompt: Option<&str>) {
        let Some(video) = self.video.take() else {
            tracing::debug!("Submit without a selected video is a no-op");
            return;
        };

        if !self.transition(SubmissionStatus::Converting) {
            tracing::debug!(status = %self.status(), "Submission already started");
            self.video = Some(video);
            return;
        }

        tracing::info!(video_name = %video.name, "Submission started");

        let audio = match self.converter.convert(&video.data).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(error = %e, "Conversion failed");
                self.fail();
                return;
            }
        };

        self.transition(SubmissionStatus::Uploading);

        let uploaded = match self.gateway.upload_audio(&audio).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                tracing::warn!(error = %e, "Upload failed");
                self.fail();
                return;
            }
        };
        self.artifact_id = Some(uploaded.id.clone());

        self.transition(SubmissionStatus::Transcribing);

        if let Err(e) = self
            .gateway
            .request_transcription(&uploaded.id, prompt)
            .await
        {
            tracing::warn!(error = %e, "Transcription request failed");
            self.fail();
            return;
        }

        self.transition(SubmissionStatus::Succeeded);
        tracing::info!(artifact_id = %uploaded.id, "Submission succeeded");

        if let Some(callback) = self.on_completed.take() {
            callback(&uploaded.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StageLog {
        calls: Mutex<Vec<&'static str>>,
    }

    impl StageLog {
        fn record(&self, stage: &'static str) {
            self.calls.lock().unwrap().push(stage);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    struct MockConverter {
        log: Arc<StageLog>,
        fail: bool,
    }

    #[async_trait]
    impl AudioConverter for MockConverter {
        async fn convert(&self, _video_bytes: &[u8]) -> anyhow::Result<AudioFile> {
            self.log.record("convert");
            if self.fail {
                anyhow::bail!("no audio track");
            }
            Ok(AudioFile {
                data: vec![1, 2, 3],
                name: "audio.mp3".to_string(),
                content_type: "audio/mpeg".to_string(),
            })
        }
    }

    struct MockGateway {
        log: Arc<StageLog>,
        fail_upload: bool,
        fail_transcription: bool,
    }

    #[async_trait]
    impl IngestGateway for MockGateway {
        async fn upload_audio(&self, _audio: &AudioFile) -> anyhow::Result<UploadedVideo> {
            self.log.record("upload");
            if self.fail_upload {
                anyhow::bail!("connection refused");
            }
            Ok(UploadedVideo {
                id: "artifact-1".to_string(),
                name: "audio.mp3".to_string(),
                path: "/tmp/audio-artifact-1.mp3".to_string(),
            })
        }

        async fn request_transcription(
            &self,
            _video_id: &str,
            _prompt: Option<&str>,
        ) -> anyhow::Result<()> {
            self.log.record("transcription");
            if self.fail_transcription {
                anyhow::bail!("server error");
            }
            Ok(())
        }
    }

    fn submission(
        fail_convert: bool,
        fail_upload: bool,
        fail_transcription: bool,
    ) -> (Submission, Arc<StageLog>) {
        let log = Arc::new(StageLog::default());
        let submission = Submission::new(
            Arc::new(MockConverter {
                log: log.clone(),
                fail: fail_convert,
            }),
            Arc::new(MockGateway {
                log: log.clone(),
                fail_upload,
                fail_transcription,
            }),
        );
        (submission, log)
    }

    #[tokio::test]
    async fn test_submit_without_video_is_noop() {
        let (mut submission, log) = submission(false, false, false);

        submission.submit(None).await;

        assert_eq!(submission.status(), SubmissionStatus::Idle);
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_run_fires_callback_once() {
        let (mut submission, log) = submission(false, false, false);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let seen_id = Arc::new(Mutex::new(String::new()));
        let seen_id_clone = seen_id.clone();

        submission.select_video("talk.mp4", vec![0u8; 64]);
        submission.on_completed(move |id| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
            *seen_id_clone.lock().unwrap() = id.to_string();
        });
        submission.submit(Some("nomes citados")).await;

        assert_eq!(submission.status(), SubmissionStatus::Succeeded);
        assert_eq!(submission.artifact_id(), Some("artifact-1"));
        assert_eq!(log.calls(), vec!["convert", "upload", "transcription"]);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(*seen_id.lock().unwrap(), "artifact-1");
    }

    #[tokio::test]
    async fn test_conversion_failure_stops_pipeline() {
        let (mut submission, log) = submission(true, false, false);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        submission.select_video("talk.mp4", vec![0u8; 64]);
        submission.on_completed(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        submission.submit(None).await;

        assert_eq!(submission.status(), SubmissionStatus::Failed);
        assert_eq!(log.calls(), vec!["convert"]);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(submission.artifact_id(), None);
    }

    #[tokio::test]
    async fn test_upload_failure_skips_transcription() {
        let (mut submission, log) = submission(false, true, false);

        submission.select_video("talk.mp4", vec![0u8; 64]);
        submission.submit(None).await;

        assert_eq!(submission.status(), SubmissionStatus::Failed);
        assert_eq!(log.calls(), vec!["convert", "upload"]);
    }

    #[tokio::test]
    async fn test_transcription_failure_never_fires_callback() {
        let (mut submission, log) = submission(false, false, true);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        submission.select_video("talk.mp4", vec![0u8; 64]);
        submission.on_completed(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        submission.submit(None).await;

        assert_eq!(submission.status(), SubmissionStatus::Failed);
        assert_eq!(log.calls(), vec!["convert", "upload", "transcription"]);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        // The artifact exists server-side even though the run failed
        assert_eq!(submission.artifact_id(), Some("artifact-1"));
    }

    #[tokio::test]
    async fn test_resubmit_after_terminal_status_is_noop() {
        let (mut submission, log) = submission(false, false, false);

        submission.select_video("talk.mp4", vec![0u8; 64]);
        submission.submit(None).await;
        assert_eq!(submission.status(), SubmissionStatus::Succeeded);

        submission.select_video("other.mp4", vec![0u8; 64]);
        submission.submit(None).await;

        assert_eq!(submission.status(), SubmissionStatus::Succeeded);
        assert_eq!(log.calls(), vec!["convert", "upload", "transcription"]);
    }

    #[tokio::test]
    async fn test_subscriber_observes_terminal_status() {
        let (mut submission, _log) = submission(false, false, false);
        let receiver = submission.subscribe();

        submission.select_video("talk.mp4", vec![0u8; 64]);
        submission.submit(None).await;

        assert_eq!(*receiver.borrow(), SubmissionStatus::Succeeded);
    }

    #[test]
    fn test_transition_table() {
        use SubmissionStatus::*;

        assert!(is_allowed_transition(Idle, Converting));
        assert!(is_allowed_transition(Converting, Uploading));
        assert!(is_allowed_transition(Uploading, Transcribing));
        assert!(is_allowed_transition(Transcribing, Succeeded));
        assert!(is_allowed_transition(Converting, Failed));

        assert!(!is_allowed_transition(Idle, Uploading));
        assert!(!is_allowed_transition(Converting, Succeeded));
        assert!(!is_allowed_transition(Succeeded, Converting));
        assert!(!is_allowed_transition(Succeeded, Failed));
        assert!(!is_allowed_transition(Failed, Failed));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(SubmissionStatus::Idle.to_string(), "Esperando");
        assert_eq!(SubmissionStatus::Converting.to_string(), "Convertendo");
        assert_eq!(SubmissionStatus::Uploading.to_string(), "Carregando");
        assert_eq!(SubmissionStatus::Transcribing.to_string(), "Transcrevendo");
        assert_eq!(SubmissionStatus::Succeeded.to_string(), "Sucesso");
        assert_eq!(SubmissionStatus::Failed.to_string(), "Falha");
    }
}
