//! Subtitle command handlers

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::UrlSource;
use crate::core::config::AppConfig;
use crate::core::models::{AppResult, ConflictPolicy, JobConfig, JobResult, SubtitleFormat};
use crate::core::reporter::summarize;
use crate::AppState;

/// Per-run overrides; anything left unset comes from the configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubtitleOptions {
    /// Empty means the configured languages
    pub languages: Vec<String>,
    pub format: Option<SubtitleFormat>,
    pub policy: Option<ConflictPolicy>,
    /// Never fall back to auto-generated captions
    pub uploaded_only: bool,
}

impl SubtitleOptions {
    pub fn job_config(&self, config: &AppConfig, output_dir: impl Into<PathBuf>) -> JobConfig {
        let languages = if self.languages.is_empty() {
            &config.subtitles.languages
        } else {
            &self.languages
        };
        let job = JobConfig::subtitles(
            languages,
            self.format.unwrap_or(config.subtitles.format),
            output_dir,
            self.policy.unwrap_or(config.defaults.policy),
        );

        if self.uploaded_only || !config.subtitles.include_auto_generated {
            job.without_auto_generated()
        } else {
            job
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubtitleRequest {
    pub source: UrlSource,
    pub output_dir: Option<PathBuf>,
    pub options: SubtitleOptions,
}

impl SubtitleRequest {
    pub fn new(source: UrlSource) -> Self {
        Self {
            source,
            output_dir: None,
            options: SubtitleOptions::default(),
        }
    }
}

/// Download subtitles for every URL of the source
pub async fn download_subtitles(
    state: &AppState,
    request: SubtitleRequest,
) -> Result<Vec<JobResult>, String> {
    info!("💬 Downloading subtitles from: {}", request.source);

    match download_subtitles_impl(state, &request).await {
        Ok(results) => {
            let summary = summarize(&results);
            info!(
                "✅ Subtitles finished: {} succeeded, {} skipped, {} failed",
                summary.succeeded, summary.skipped, summary.failed
            );
            Ok(results)
        }
        Err(e) => {
            error!("❌ Failed to download subtitles: {}", e);
            Err(e.to_string())
        }
    }
}

// Implementation functions

async fn download_subtitles_impl(
    state: &AppState,
    request: &SubtitleRequest,
) -> AppResult<Vec<JobResult>> {
    let output_dir = request
        .output_dir
        .clone()
        .unwrap_or_else(|| state.config.defaults.output_dir.clone());
    let config = request.options.job_config(&state.config, output_dir);

    let urls = request.source.load()?;
    if urls.is_empty() {
        warn!("⚠️ No URLs found in {}", request.source);
        return Ok(Vec::new());
    }
    state.job().run(&urls, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::TargetKind;

    #[test]
    fn test_options_fall_back_to_config() {
        let config = AppConfig::default();
        let job = SubtitleOptions::default().job_config(&config, "subs");

        assert_eq!(job.policy, ConflictPolicy::SkipIfExists);
        match job.kind {
            TargetKind::Subtitles {
                languages,
                format,
                include_auto_generated,
            } => {
                assert_eq!(languages, vec!["vi", "en"]);
                assert_eq!(format, SubtitleFormat::Vtt);
                assert!(include_auto_generated);
            }
            _ => panic!("expected subtitles"),
        }
    }

    #[test]
    fn test_options_override_config() {
        let options = SubtitleOptions {
            languages: vec!["en".to_string()],
            format: Some(SubtitleFormat::Srt),
            policy: Some(ConflictPolicy::Overwrite),
            uploaded_only: true,
        };
        let job = options.job_config(&AppConfig::default(), "subs");

        assert_eq!(job.policy, ConflictPolicy::Overwrite);
        assert_eq!(
            job.kind,
            TargetKind::Subtitles {
                languages: vec!["en".to_string()],
                format: SubtitleFormat::Srt,
                include_auto_generated: false,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_url_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(AppConfig::default());
        let mut request = SubtitleRequest::new(UrlSource::File(dir.path().join("missing.txt")));
        request.output_dir = Some(dir.path().to_path_buf());

        let err = download_subtitles(&state, request).await.unwrap_err();
        assert!(err.contains("missing.txt"));
    }
}
