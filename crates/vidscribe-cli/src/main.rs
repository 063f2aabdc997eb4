//! Vidscribe CLI — submit a video for transcription.
//!
//! Reads API_URL and FFMPEG_PATH from the environment (or `.env`); both can
//! be overridden per invocation.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use vidscribe_client::{ApiClient, LocalConverter, Submission, SubmissionStatus};
use vidscribe_core::Config;

#[derive(Parser)]
#[command(name = "vidscribe", about = "Vidscribe ingestion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a video: extract audio locally, upload, request transcription
    Submit {
        /// Path to the video file
        file: std::path::PathBuf,
        /// Keywords mentioned in the video, comma separated
        #[arg(long)]
        prompt: Option<String>,
        /// Ingestion API base URL (overrides API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
}

/// Initialize tracing for the CLI binary.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit {
            file,
            prompt,
            api_url,
        } => {
            let base_url = api_url.unwrap_or_else(|| config.api_url().to_string());
            let client = ApiClient::new(base_url).context("Failed to create API client")?;
            let converter = LocalConverter::new(config.ffmpeg_path());

            let video_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let video_bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let mut submission = Submission::new(Arc::new(converter), Arc::new(client));
            submission.select_video(video_name, video_bytes);
            submission.on_completed(|artifact_id| {
                println!("Artifact id: {}", artifact_id);
            });

            // Print every status change while the pipeline runs.
            let mut status_rx = submission.subscribe();
            let printer = tokio::spawn(async move {
                while status_rx.changed().await.is_ok() {
                    println!("{}", *status_rx.borrow_and_update());
                }
            });

            submission.submit(prompt.as_deref()).await;
            let final_status = submission.status();
            drop(submission);
            printer.await.ok();

            if final_status == SubmissionStatus::Failed {
                anyhow::bail!("Submission failed");
            }
        }
    }

    Ok(())
}
