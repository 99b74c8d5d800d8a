//! Skip-or-overwrite decision made before the external tool is invoked
//!
//! The check is not atomic with the download that follows. Another process
//! creating the same file in between only means yt-dlp applies its own
//! overwrite flag, which mirrors the configured policy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::artifacts::OutputArtifactDescriptor;
use crate::core::models::ConflictPolicy;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Skip,
}

pub struct ConflictResolver;

impl ConflictResolver {
    /// `SkipIfExists` skips only when every expected file is already on disk;
    /// a partial set counts as incomplete and is fetched again.
    pub fn resolve(descriptor: &OutputArtifactDescriptor, policy: ConflictPolicy) -> Decision {
        match policy {
            ConflictPolicy::Overwrite => Decision::Proceed,
            ConflictPolicy::SkipIfExists => {
                if descriptor.paths.is_empty() {
                    return Decision::Proceed;
                }
                let existing = descriptor.existing().len();
                debug!(
                    "{}: {}/{} expected file(s) present",
                    descriptor.url,
                    existing,
                    descriptor.paths.len()
                );
                if existing == descriptor.paths.len() {
                    Decision::Skip
                } else {
                    Decision::Proceed
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::UrlEntry;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn descriptor(dir: &std::path::Path, names: &[&str]) -> OutputArtifactDescriptor {
        OutputArtifactDescriptor {
            url: UrlEntry::new("vid1").unwrap(),
            output_dir: dir.to_path_buf(),
            stem: "Talk [vid1] - 2024-01-01".to_string(),
            paths: names.iter().map(|n| dir.join(n)).collect::<Vec<PathBuf>>(),
        }
    }

    #[test]
    fn test_skip_when_all_files_exist() {
        let dir = tempdir().unwrap();
        let d = descriptor(dir.path(), &["a.en.vtt", "a.vi.vtt"]);
        for path in &d.paths {
            fs::write(path, "WEBVTT").unwrap();
        }
        assert_eq!(
            ConflictResolver::resolve(&d, ConflictPolicy::SkipIfExists),
            Decision::Skip
        );
    }

    #[test]
    fn test_partial_set_is_reattempted() {
        let dir = tempdir().unwrap();
        let d = descriptor(dir.path(), &["a.en.vtt", "a.vi.vtt"]);
        fs::write(&d.paths[0], "WEBVTT").unwrap();
        assert_eq!(
            ConflictResolver::resolve(&d, ConflictPolicy::SkipIfExists),
            Decision::Proceed
        );
    }

    #[test]
    fn test_overwrite_always_proceeds() {
        let dir = tempdir().unwrap();
        let d = descriptor(dir.path(), &["a.mp3"]);
        fs::write(&d.paths[0], b"ID3").unwrap();
        assert_eq!(
            ConflictResolver::resolve(&d, ConflictPolicy::Overwrite),
            Decision::Proceed
        );
    }

    #[test]
    fn test_directory_with_expected_name_does_not_count() {
        let dir = tempdir().unwrap();
        let d = descriptor(dir.path(), &["a.mp3"]);
        fs::create_dir(&d.paths[0]).unwrap();
        assert_eq!(
            ConflictResolver::resolve(&d, ConflictPolicy::SkipIfExists),
            Decision::Proceed
        );
    }

    #[test]
    fn test_empty_descriptor_proceeds() {
        let dir = tempdir().unwrap();
        let d = descriptor(dir.path(), &[]);
        assert_eq!(
            ConflictResolver::resolve(&d, ConflictPolicy::SkipIfExists),
            Decision::Proceed
        );
    }
}
