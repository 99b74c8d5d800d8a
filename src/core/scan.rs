//! Folder scan mode
//!
//! Finds URL lists by folder, file or glob pattern and runs one acquisition
//! job per list, writing next to the list itself.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::core::job::AcquisitionJob;
use crate::core::models::{AppResult, JobConfig, JobResult};
use crate::core::url_store::UrlStore;

/// Results of one URL list found by a scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanFileReport {
    pub url_file: PathBuf,
    pub output_dir: PathBuf,
    pub results: Vec<JobResult>,
    /// Set when the list could not be processed at all
    pub error: Option<String>,
}

/// URL lists matching `location`, sorted and de-duplicated.
///
/// `location` may be a glob pattern (`courses/*/url_yt.txt`), a folder searched
/// recursively for `file_name`, or a single file. A path that does not exist
/// falls back to a recursive search from its parent, or from the current
/// folder when the parent is missing too.
pub fn find_url_files(location: &Path, file_name: &str) -> Vec<PathBuf> {
    let text = location.to_string_lossy();
    if text.contains(['*', '?', '[']) {
        return glob_files(&text);
    }
    if location.is_file() {
        return vec![location.to_path_buf()];
    }
    if location.is_dir() {
        return walk_for(location, file_name);
    }

    let base = location
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty() && parent.is_dir())
        .unwrap_or(Path::new("."));
    warn!(
        "⚠️ {} does not exist, searching {} instead",
        location.display(),
        base.display()
    );
    walk_for(base, file_name)
}

fn glob_files(pattern: &str) -> Vec<PathBuf> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(e) => {
            warn!("⚠️ Invalid scan pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    let found: BTreeSet<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path during scan: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    found.into_iter().collect()
}

fn walk_for(root: &Path, file_name: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable path during scan: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// Run `config` once per discovered list, output going to each list's folder.
///
/// A list that cannot be read or run is reported with its error and the
/// scan moves on to the next one. Lists without URLs are left out.
pub async fn run_scan(
    job: &AcquisitionJob,
    location: &Path,
    file_name: &str,
    config: &JobConfig,
) -> Vec<ScanFileReport> {
    let files = find_url_files(location, file_name);
    info!("🔎 Found {} URL list(s) for {}", files.len(), location.display());

    let mut reports = Vec::with_capacity(files.len());
    for url_file in files {
        if job.is_cancelled() {
            warn!("⏹️ Scan cancelled before {}", url_file.display());
            break;
        }

        let output_dir = url_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        match scan_one(job, &url_file, &config.with_output_dir(&output_dir)).await {
            Ok(Some(results)) => reports.push(ScanFileReport {
                url_file,
                output_dir,
                results,
                error: None,
            }),
            Ok(None) => warn!("⚠️ {} has no URLs, skipping", url_file.display()),
            Err(e) => {
                error!("❌ {}: {}", url_file.display(), e);
                reports.push(ScanFileReport {
                    url_file,
                    output_dir,
                    results: Vec::new(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    reports
}

async fn scan_one(
    job: &AcquisitionJob,
    url_file: &Path,
    config: &JobConfig,
) -> AppResult<Option<Vec<JobResult>>> {
    let urls = UrlStore::load(url_file)?;
    if urls.is_empty() {
        return Ok(None);
    }
    info!("📂 {} ({} URL(s))", url_file.display(), urls.len());
    Ok(Some(job.run(&urls, config).await?))
}
