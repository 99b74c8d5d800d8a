//! Command handlers
//!
//! This module contains the handlers invoked by the command line and the
//! interactive shell. Handlers log their start and outcome and hand errors
//! back as display strings.

pub mod audio;
pub mod collect;
pub mod scan;
pub mod subtitles;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::models::{AppResult, UrlEntry};
use crate::core::url_store::UrlStore;
use crate::utils::validation::is_valid_video_url;

// Re-export all command functions for easy access
pub use audio::*;
pub use collect::*;
pub use scan::*;
pub use subtitles::*;

/// Where a run takes its URLs from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum UrlSource {
    /// A URL list file
    File(PathBuf),
    /// One video URL typed directly
    Single(UrlEntry),
}

impl UrlSource {
    /// http(s) input is a single video, anything else a list file path.
    /// Blank input yields `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let entry = UrlEntry::new(input.trim_matches('"'))?;
        if is_valid_video_url(entry.as_str()) {
            Some(UrlSource::Single(entry))
        } else {
            Some(UrlSource::File(PathBuf::from(entry.as_str())))
        }
    }

    pub fn load(&self) -> AppResult<Vec<UrlEntry>> {
        match self {
            UrlSource::File(path) => UrlStore::load(path),
            UrlSource::Single(entry) => Ok(vec![entry.clone()]),
        }
    }
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlSource::File(path) => write!(f, "{}", path.display()),
            UrlSource::Single(entry) => write!(f, "{}", entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_source_parse() {
        assert_eq!(UrlSource::parse("  "), None);
        assert_eq!(
            UrlSource::parse("https://youtu.be/abc"),
            Some(UrlSource::Single(UrlEntry::new("https://youtu.be/abc").unwrap()))
        );
        assert_eq!(
            UrlSource::parse("\"D:\\phathoc\\url_yt.txt\""),
            Some(UrlSource::File(PathBuf::from("D:\\phathoc\\url_yt.txt")))
        );
    }

    #[test]
    fn test_single_source_loads_itself() {
        let source = UrlSource::parse("https://youtu.be/abc").unwrap();
        assert_eq!(source.load().unwrap().len(), 1);
    }
}
