//! Acquisition job
//!
//! Drives one run over an ordered URL list: probe metadata, work out the
//! expected files, consult the conflict policy, invoke the tool and verify
//! what landed on disk. URLs are processed strictly one after another and a
//! failing URL never stops the run.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::core::artifacts::OutputArtifactDescriptor;
use crate::core::conflict::{ConflictResolver, Decision};
use crate::core::models::{
    AppError, AppResult, ConflictPolicy, JobConfig, JobResult, JobStatus, TargetKind, UrlEntry,
};
use crate::core::url_store::UrlStore;
use crate::core::ytdlp::{FetchRequest, ToolRunner};
use crate::utils::file_utils::ensure_dir_exists;

/// Called after each URL with `(index, total, result)`, index starting at 1
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &JobResult) + Send + Sync>;

pub struct AcquisitionJob {
    runner: Arc<dyn ToolRunner>,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl AcquisitionJob {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Process every URL in order and return one result per processed URL.
    ///
    /// Configuration problems and an unusable output directory fail the whole
    /// run before any URL is touched. After cancellation the results gathered
    /// so far are returned.
    pub async fn run(&self, urls: &[UrlEntry], config: &JobConfig) -> AppResult<Vec<JobResult>> {
        config.validate()?;
        ensure_dir_exists(&config.output_dir)?;

        info!(
            "🚀 Starting {} run: {} URL(s) -> {} ({})",
            config.kind.label(),
            urls.len(),
            config.output_dir.display(),
            config.policy
        );

        let total = urls.len();
        let mut results = Vec::with_capacity(total);

        for (index, url) in urls.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    "⏹️ Run cancelled after {}/{} URL(s)",
                    results.len(),
                    total
                );
                break;
            }

            info!("[{}/{}] {}", index + 1, total, url);
            let result = self.process(url, config).await;

            match result.status {
                JobStatus::Succeeded => info!("✅ {}", url),
                JobStatus::Skipped => info!("⏭️ {} skipped", url),
                JobStatus::Failed => error!(
                    "❌ {}: {}",
                    url,
                    result.detail.as_deref().unwrap_or("unknown error")
                ),
            }

            if let Some(progress) = &self.progress {
                progress(index + 1, total, &result);
            }
            results.push(result);
        }

        info!("🏁 Run finished: {}/{} URL(s) processed", results.len(), total);
        Ok(results)
    }

    /// Load a URL list and run it
    pub async fn run_from_file(
        &self,
        url_file: &Path,
        config: &JobConfig,
    ) -> AppResult<Vec<JobResult>> {
        let urls = UrlStore::load(url_file)?;
        self.run(&urls, config).await
    }

    async fn process(&self, url: &UrlEntry, config: &JobConfig) -> JobResult {
        let metadata = match self.runner.probe(url.as_str()).await {
            Ok(metadata) => metadata,
            Err(e) => return JobResult::failed(url.clone(), tool_message(&e), Vec::new()),
        };

        let descriptor = OutputArtifactDescriptor::describe(url, &metadata, config);

        if ConflictResolver::resolve(&descriptor, config.policy) == Decision::Skip {
            let count = descriptor.paths.len();
            return JobResult::skipped(url.clone(), descriptor.paths)
                .with_detail(format!("{} expected file(s) already exist", count));
        }

        let request = FetchRequest {
            url: url.as_str(),
            kind: &config.kind,
            descriptor: &descriptor,
            overwrite: config.policy == ConflictPolicy::Overwrite,
        };

        let outcome = match self.runner.fetch(&request).await {
            Ok(outcome) => outcome,
            Err(e) => return JobResult::failed(url.clone(), tool_message(&e), descriptor.paths),
        };

        if !outcome.success {
            return JobResult::failed(url.clone(), outcome.failure_detail(), descriptor.paths);
        }

        verify_artifacts(url, &config.kind, descriptor)
    }
}

/// Check what a successful invocation left on disk
fn verify_artifacts(
    url: &UrlEntry,
    kind: &TargetKind,
    descriptor: OutputArtifactDescriptor,
) -> JobResult {
    match kind {
        TargetKind::Subtitles { languages, .. } => {
            let missing: Vec<&str> = languages
                .iter()
                .zip(&descriptor.paths)
                .filter(|(_, path)| !path.is_file())
                .map(|(lang, _)| lang.as_str())
                .collect();

            if missing.len() == languages.len() {
                JobResult::failed(
                    url.clone(),
                    format!("no subtitles available for languages [{}]", languages.join(", ")),
                    descriptor.paths,
                )
            } else if missing.is_empty() {
                JobResult::succeeded(url.clone(), descriptor.paths)
            } else {
                JobResult::succeeded(url.clone(), descriptor.paths)
                    .with_detail(format!("no subtitles for [{}]", missing.join(", ")))
            }
        }
        TargetKind::Audio { .. } => {
            if descriptor.paths.first().is_some_and(|p| p.is_file()) {
                return JobResult::succeeded(url.clone(), descriptor.paths);
            }
            let detail = format!(
                "transcoding produced no output (expected {})",
                descriptor
                    .paths
                    .first()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            );
            JobResult::failed(url.clone(), detail, descriptor.paths)
        }
    }
}

fn tool_message(e: &AppError) -> String {
    match e {
        AppError::Tool(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{AudioCodec, SubtitleFormat, VideoMetadata};
    use crate::core::ytdlp::ToolOutcome;
    use async_trait::async_trait;
    use tempfile::tempdir;

    /// Probes succeed, fetches report success without writing anything
    struct SilentRunner;

    #[async_trait]
    impl ToolRunner for SilentRunner {
        async fn probe(&self, url: &str) -> AppResult<VideoMetadata> {
            Ok(VideoMetadata {
                id: url.to_string(),
                title: "Talk".to_string(),
                upload_date: None,
            })
        }

        async fn fetch(&self, _request: &FetchRequest<'_>) -> AppResult<ToolOutcome> {
            Ok(ToolOutcome::succeeded())
        }

        async fn list_entries(&self, _url: &str) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn urls(items: &[&str]) -> Vec<UrlEntry> {
        items.iter().filter_map(|s| UrlEntry::new(s)).collect()
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_any_url() {
        let dir = tempdir().unwrap();
        let config =
            JobConfig::audio(AudioCodec::Mp3, "loud", dir.path(), ConflictPolicy::SkipIfExists);
        let job = AcquisitionJob::new(Arc::new(SilentRunner));

        let result = job.run(&urls(&["a"]), &config).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let config = JobConfig::audio(
            AudioCodec::Mp3,
            "192",
            blocker.join("out"),
            ConflictPolicy::SkipIfExists,
        );
        let job = AcquisitionJob::new(Arc::new(SilentRunner));

        let result = job.run(&urls(&["a"]), &config).await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[tokio::test]
    async fn test_empty_url_list_creates_dir_and_returns_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("subs");
        let config =
            JobConfig::subtitles(["en"], SubtitleFormat::Vtt, &out, ConflictPolicy::SkipIfExists);
        let job = AcquisitionJob::new(Arc::new(SilentRunner));

        let results = job.run(&[], &config).await.unwrap();
        assert!(results.is_empty());
        assert!(out.is_dir());
    }

    #[tokio::test]
    async fn test_zero_exit_without_files_is_failure() {
        let dir = tempdir().unwrap();
        let job = AcquisitionJob::new(Arc::new(SilentRunner));

        let subs = JobConfig::subtitles(
            ["en", "vi"],
            SubtitleFormat::Vtt,
            dir.path(),
            ConflictPolicy::SkipIfExists,
        );
        let results = job.run(&urls(&["a"]), &subs).await.unwrap();
        assert_eq!(results[0].status, JobStatus::Failed);
        assert_eq!(
            results[0].detail.as_deref(),
            Some("no subtitles available for languages [en, vi]")
        );

        let audio =
            JobConfig::audio(AudioCodec::Opus, "128", dir.path(), ConflictPolicy::SkipIfExists);
        let results = job.run(&urls(&["a"]), &audio).await.unwrap();
        assert_eq!(results[0].status, JobStatus::Failed);
        assert!(results[0]
            .detail
            .as_deref()
            .unwrap()
            .starts_with("transcoding produced no output"));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_first_url() {
        let dir = tempdir().unwrap();
        let config = JobConfig::subtitles(
            ["en"],
            SubtitleFormat::Vtt,
            dir.path(),
            ConflictPolicy::SkipIfExists,
        );
        let cancel = CancellationToken::new();
        cancel.cancel();
        let job = AcquisitionJob::new(Arc::new(SilentRunner)).with_cancellation(cancel);

        let results = job.run(&urls(&["a", "b"]), &config).await.unwrap();
        assert!(results.is_empty());
    }
}
