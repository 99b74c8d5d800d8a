//! Run summary

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::core::models::{JobResult, JobStatus, UrlEntry};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureRecord {
    pub url: UrlEntry,
    pub detail: String,
}

/// Aggregated counts of one run, failures in processing order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailureRecord>,
}

impl JobSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Merge another summary into this one, used when a scan covers several files
    pub fn absorb(&mut self, other: JobSummary) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.failures.extend(other.failures);
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "Done: {} succeeded, {} skipped, {} failed (total {})",
            self.succeeded,
            self.skipped,
            self.failed,
            self.total()
        );

        if !self.failures.is_empty() {
            out.push_str("\nFailed URLs:");
            for failure in &self.failures {
                let _ = write!(out, "\n- {}\n  {}", failure.url, failure.detail);
            }
        }
        out
    }
}

pub fn summarize(results: &[JobResult]) -> JobSummary {
    results.iter().fold(JobSummary::default(), |mut summary, result| {
        match result.status {
            JobStatus::Succeeded => summary.succeeded += 1,
            JobStatus::Skipped => summary.skipped += 1,
            JobStatus::Failed => {
                summary.failed += 1;
                summary.failures.push(FailureRecord {
                    url: result.url.clone(),
                    detail: result
                        .detail
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string()),
                });
            }
        }
        summary
    })
}
