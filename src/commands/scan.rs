//! Folder scan command handlers

use std::path::PathBuf;

use tracing::{error, info};

use super::subtitles::SubtitleOptions;
use crate::core::models::AppResult;
use crate::core::reporter::{summarize, JobSummary};
use crate::core::scan::{run_scan, ScanFileReport};
use crate::AppState;

/// Download subtitles for every URL list found under `root`, each into its own folder
pub async fn scan_subtitles(
    state: &AppState,
    root: PathBuf,
    options: SubtitleOptions,
) -> Result<Vec<ScanFileReport>, String> {
    info!("🔎 Scanning {} for URL lists", root.display());

    match scan_subtitles_impl(state, &root, &options).await {
        Ok(reports) => {
            let summary = scan_summary(&reports);
            info!(
                "✅ Scan finished: {} list(s) ({} unusable), {} succeeded, {} skipped, {} failed",
                reports.len(),
                unusable_lists(&reports).count(),
                summary.succeeded,
                summary.skipped,
                summary.failed
            );
            Ok(reports)
        }
        Err(e) => {
            error!("❌ Scan failed: {}", e);
            Err(e.to_string())
        }
    }
}

/// Combined summary over all lists of a scan
pub fn scan_summary(reports: &[ScanFileReport]) -> JobSummary {
    reports
        .iter()
        .fold(JobSummary::default(), |mut total, report| {
            total.absorb(summarize(&report.results));
            total
        })
}

/// Lists that could not be read or run
pub fn unusable_lists(reports: &[ScanFileReport]) -> impl Iterator<Item = &ScanFileReport> {
    reports.iter().filter(|report| report.error.is_some())
}

async fn scan_subtitles_impl(
    state: &AppState,
    root: &std::path::Path,
    options: &SubtitleOptions,
) -> AppResult<Vec<ScanFileReport>> {
    // output_dir is replaced per discovered list
    let config = options.job_config(&state.config, ".");
    config.validate()?;

    let reports = run_scan(
        &state.job(),
        root,
        &state.config.defaults.url_file_name,
        &config,
    )
    .await;
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;

    #[tokio::test]
    async fn test_scan_of_missing_folder_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(AppConfig::default());

        let reports = scan_subtitles(&state, dir.path().join("nope"), SubtitleOptions::default())
            .await
            .unwrap();
        assert!(reports.is_empty());
        assert!(scan_summary(&reports).is_clean());
    }

    #[tokio::test]
    async fn test_invalid_languages_fail_before_scanning() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(AppConfig::default());
        let options = SubtitleOptions {
            languages: vec!["not a code".to_string()],
            ..SubtitleOptions::default()
        };

        let err = scan_subtitles(&state, dir.path().to_path_buf(), options)
            .await
            .unwrap_err();
        assert!(err.contains("Invalid language code"));
    }

    #[test]
    fn test_unusable_lists() {
        let report = |error: Option<&str>| ScanFileReport {
            url_file: PathBuf::from("url_yt.txt"),
            output_dir: PathBuf::from("."),
            results: Vec::new(),
            error: error.map(str::to_string),
        };
        let reports = vec![report(None), report(Some("Cannot read URL list"))];
        assert_eq!(unusable_lists(&reports).count(), 1);
    }
}
