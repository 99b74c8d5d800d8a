//! Audio extraction command handlers

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::UrlSource;
use crate::core::config::AppConfig;
use crate::core::models::{AppError, AppResult, AudioCodec, ConflictPolicy, JobConfig, JobResult};
use crate::core::reporter::summarize;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioRequest {
    pub source: UrlSource,
    pub output_dir: Option<PathBuf>,
    pub codec: Option<AudioCodec>,
    /// Bitrate in kbps
    pub quality: Option<String>,
    pub policy: Option<ConflictPolicy>,
}

impl AudioRequest {
    pub fn new(source: UrlSource) -> Self {
        Self {
            source,
            output_dir: None,
            codec: None,
            quality: None,
            policy: None,
        }
    }

    pub fn job_config(&self, config: &AppConfig) -> AppResult<JobConfig> {
        let codec = match self.codec {
            Some(codec) => codec,
            None => config.audio.codec.parse().map_err(|e: AppError| {
                AppError::Config(format!("audio.codec in the configuration: {}", e))
            })?,
        };
        let quality = self
            .quality
            .clone()
            .unwrap_or_else(|| config.audio.quality.clone());
        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| config.defaults.output_dir.clone());

        Ok(JobConfig::audio(
            codec,
            quality,
            output_dir,
            self.policy.unwrap_or(config.defaults.policy),
        ))
    }
}

/// Extract audio for every URL of the source
pub async fn extract_audio(
    state: &AppState,
    request: AudioRequest,
) -> Result<Vec<JobResult>, String> {
    info!("🎵 Extracting audio from: {}", request.source);

    match extract_audio_impl(state, &request).await {
        Ok(results) => {
            let summary = summarize(&results);
            info!(
                "✅ Audio finished: {} succeeded, {} skipped, {} failed",
                summary.succeeded, summary.skipped, summary.failed
            );
            Ok(results)
        }
        Err(e) => {
            error!("❌ Failed to extract audio: {}", e);
            Err(e.to_string())
        }
    }
}

// Implementation functions

async fn extract_audio_impl(state: &AppState, request: &AudioRequest) -> AppResult<Vec<JobResult>> {
    let config = request.job_config(&state.config)?;
    let urls = request.source.load()?;
    if urls.is_empty() {
        warn!("⚠️ No URLs found in {}", request.source);
        return Ok(Vec::new());
    }
    state.job().run(&urls, &config).await
}
