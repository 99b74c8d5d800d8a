//! URL collection command handlers

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::collector::{collect, CollectMode, CollectOutcome};
use crate::core::models::AppResult;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectRequest {
    /// Playlist or channel URL
    pub source_url: String,
    /// Folder receiving the URL list, the configured output folder when unset
    pub out_dir: Option<PathBuf>,
    pub mode: CollectMode,
}

/// Collect playlist or channel video URLs into a URL list
pub async fn collect_urls(
    state: &AppState,
    request: CollectRequest,
) -> Result<CollectOutcome, String> {
    info!(
        "📋 Collecting URLs from: {} ({:?})",
        request.source_url, request.mode
    );

    match collect_urls_impl(state, &request).await {
        Ok(outcome) => {
            info!(
                "✅ {} new URL(s) written to {}",
                outcome.added,
                outcome.url_file.display()
            );
            Ok(outcome)
        }
        Err(e) => {
            error!("❌ Failed to collect URLs: {}", e);
            Err(e.to_string())
        }
    }
}

async fn collect_urls_impl(
    state: &AppState,
    request: &CollectRequest,
) -> AppResult<CollectOutcome> {
    let out_dir = request
        .out_dir
        .clone()
        .unwrap_or_else(|| state.config.defaults.output_dir.clone());

    collect(
        state.runner.as_ref(),
        request.source_url.trim(),
        &out_dir,
        &state.config.defaults.url_file_name,
        request.mode,
    )
    .await
}
