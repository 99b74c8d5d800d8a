//! Playlist and channel URL collection
//!
//! Lists the videos of a playlist or channel through yt-dlp and stores their
//! watch URLs in a URL list file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::models::{AppError, AppResult, UrlEntry};
use crate::core::url_store::UrlStore;
use crate::core::ytdlp::ToolRunner;
use crate::utils::validation::{is_valid_video_url, is_youtube_url};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectMode {
    /// New URLs go on top of the existing list, which is backed up first
    #[default]
    Prepend,
    /// The list is rewritten with exactly the collected URLs
    Replace,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectOutcome {
    pub url_file: PathBuf,
    /// URLs reported by the source
    pub found: usize,
    /// URLs newly written to the list
    pub added: usize,
    pub backup: Option<PathBuf>,
}

/// Collect the videos of `source_url` into `<out_dir>/<file_name>`
pub async fn collect(
    runner: &dyn ToolRunner,
    source_url: &str,
    out_dir: &Path,
    file_name: &str,
    mode: CollectMode,
) -> AppResult<CollectOutcome> {
    if !is_valid_video_url(source_url) {
        return Err(AppError::Validation(format!(
            "Not an http(s) URL: {}",
            source_url
        )));
    }

    if !is_youtube_url(source_url) {
        warn!("⚠️ {} is not a YouTube address, listing it anyway", source_url);
    }

    let listed = runner.list_entries(source_url).await?;
    let entries: Vec<UrlEntry> = listed.iter().filter_map(|u| UrlEntry::new(u)).collect();
    if entries.is_empty() {
        warn!("⚠️ No videos found at {}", source_url);
    }

    let url_file = out_dir.join(file_name);
    let outcome = match mode {
        CollectMode::Prepend => {
            let merged = UrlStore::merge_prepend(&url_file, &entries)?;
            CollectOutcome {
                url_file,
                found: entries.len(),
                added: merged.added,
                backup: merged.backup,
            }
        }
        CollectMode::Replace => {
            let mut seen = HashSet::new();
            let unique: Vec<UrlEntry> = entries
                .iter()
                .filter(|entry| seen.insert(*entry))
                .cloned()
                .collect();
            UrlStore::save(&url_file, &unique)?;
            CollectOutcome {
                url_file,
                found: entries.len(),
                added: unique.len(),
                backup: None,
            }
        }
    };

    info!(
        "📥 Collected {} URL(s) from {} into {}",
        outcome.found,
        source_url,
        outcome.url_file.display()
    );
    Ok(outcome)
}
