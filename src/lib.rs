//! YT Toolkit - Core Library
//!
//! This library provides batch YouTube subtitle download, audio extraction and
//! playlist URL collection on top of the `yt-dlp` command line tool.

pub mod commands;
pub mod core;
pub mod shell;
pub mod utils;

// Re-export commonly used types
pub use core::{
    collector::{CollectMode, CollectOutcome},
    config::AppConfig,
    job::{AcquisitionJob, ProgressCallback},
    models::{
        AppError, AppResult, AudioCodec, ConflictPolicy, JobConfig, JobResult, JobStatus,
        SubtitleFormat, TargetKind, UrlEntry,
    },
    reporter::{summarize, JobSummary},
    url_store::UrlStore,
    ytdlp::{ToolRunner, YtDlpRunner},
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Application state shared between command handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub runner: Arc<dyn ToolRunner>,
    /// Cancelled on Ctrl+C; checked between URLs
    pub cancel: CancellationToken,
    pub progress: Option<ProgressCallback>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let runner = Arc::new(YtDlpRunner::new(config.tools.clone()));
        Self::with_runner(config, runner)
    }

    pub fn with_runner(config: AppConfig, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            config,
            runner,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Job wired to this state's runner and cancellation token
    pub fn job(&self) -> AcquisitionJob {
        let job = AcquisitionJob::new(self.runner.clone()).with_cancellation(self.cancel.clone());
        match &self.progress {
            Some(progress) => job.with_progress(progress.clone()),
            None => job,
        }
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging for the library, `level` overriding the default filter
pub fn init(level: Option<&str>) -> anyhow::Result<()> {
    utils::logging::init_tracing(level);
    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init(None).is_ok());
        // second initialisation is ignored
        assert!(init(Some("debug")).is_ok());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
    }

    #[tokio::test]
    async fn test_job_shares_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(AppConfig::default());
        let config = JobConfig::subtitles(
            ["en"],
            SubtitleFormat::Vtt,
            dir.path(),
            ConflictPolicy::Overwrite,
        );
        let urls: Vec<UrlEntry> = ["https://youtu.be/a", "https://youtu.be/b"]
            .iter()
            .filter_map(|u| UrlEntry::new(u))
            .collect();

        state.cancel.cancel();
        let results = state.job().run(&urls, &config).await.unwrap();
        assert!(results.is_empty());
    }
}
