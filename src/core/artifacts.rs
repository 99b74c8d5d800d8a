//! Output file layout
//!
//! Every URL maps to a deterministic file stem,
//! `<Title> [<VideoID>] - <YYYY-MM-DD>`, under the run's output directory.
//! Audio lands in `<stem>.<codec>`, subtitles in `<stem>.<lang>.<vtt|srt>`.
//! The directory and stem are handed to yt-dlp as a literal output template
//! so the tool writes exactly the paths computed here. yt-dlp expands
//! environment variables in that template, so `$` never appears in a stem and
//! output directories containing `$` are refused by `JobConfig::validate`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::models::{JobConfig, TargetKind, UrlEntry, VideoMetadata};
use crate::utils::file_utils::{sanitize_filename, truncate_to_bytes};

/// Titles longer than this (in bytes) are cut on a character boundary
pub const TITLE_MAX_BYTES: usize = 200;

/// Expected output files for one URL under one configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputArtifactDescriptor {
    pub url: UrlEntry,
    pub output_dir: PathBuf,
    pub stem: String,
    /// In language order for subtitles, a single file for audio
    pub paths: Vec<PathBuf>,
}

impl OutputArtifactDescriptor {
    pub fn describe(url: &UrlEntry, metadata: &VideoMetadata, config: &JobConfig) -> Self {
        let stem = file_stem(metadata);
        let paths = match &config.kind {
            TargetKind::Subtitles {
                languages, format, ..
            } => languages
                .iter()
                .map(|lang| {
                    config
                        .output_dir
                        .join(format!("{}.{}.{}", stem, lang, format.extension()))
                })
                .collect(),
            TargetKind::Audio { codec, .. } => {
                vec![config
                    .output_dir
                    .join(format!("{}.{}", stem, codec.extension()))]
            }
        };

        Self {
            url: url.clone(),
            output_dir: config.output_dir.clone(),
            stem,
            paths,
        }
    }

    /// yt-dlp `-o` value producing exactly `paths`
    pub fn output_template(&self) -> String {
        let literal = self.output_dir.join(&self.stem);
        format!("{}.%(ext)s", escape_template_literal(&literal.to_string_lossy()))
    }

    pub fn existing(&self) -> Vec<&Path> {
        self.paths
            .iter()
            .filter(|p| p.is_file())
            .map(PathBuf::as_path)
            .collect()
    }
}

/// `<Title> [<VideoID>] - <YYYY-MM-DD>`, date part omitted when unknown
pub fn file_stem(metadata: &VideoMetadata) -> String {
    let title = sanitize_filename(&metadata.title);
    let title = truncate_to_bytes(&title, TITLE_MAX_BYTES).trim_end();
    let title = if title.is_empty() { "unknown" } else { title };
    let id = sanitize_filename(&metadata.id);

    let stem = match metadata.upload_date {
        Some(date) => format!("{} [{}] - {}", title, id, date.format("%Y-%m-%d")),
        None => format!("{} [{}]", title, id),
    };
    stem.replace('$', "\u{FF04}")
}

fn escape_template_literal(text: &str) -> String {
    text.replace('%', "%%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{AudioCodec, ConflictPolicy, SubtitleFormat};
    use chrono::NaiveDate;

    fn metadata(title: &str) -> VideoMetadata {
        VideoMetadata {
            id: "UyqlT52hIO8".to_string(),
            title: title.to_string(),
            upload_date: NaiveDate::from_ymd_opt(2024, 3, 9),
        }
    }

    #[test]
    fn test_file_stem_layout() {
        assert_eq!(
            file_stem(&metadata("Pháp thoại: Buông xả")),
            "Pháp thoại Buông xả [UyqlT52hIO8] - 2024-03-09"
        );
    }

    #[test]
    fn test_file_stem_without_date_or_title() {
        let meta = VideoMetadata {
            id: "abc".to_string(),
            title: "???".to_string(),
            upload_date: None,
        };
        assert_eq!(file_stem(&meta), "unknown [abc]");
    }

    #[test]
    fn test_long_titles_are_truncated() {
        let stem = file_stem(&metadata(&"ệ".repeat(150)));
        let title = stem.split(" [").next().unwrap();
        assert!(title.len() <= TITLE_MAX_BYTES);
        assert!(title.chars().all(|c| c == 'ệ'));
    }

    #[test]
    fn test_dollar_in_title_never_reaches_template() {
        let url = UrlEntry::new("https://youtu.be/abc").unwrap();
        let config =
            JobConfig::audio(AudioCodec::Mp3, "192", "/out/50%", ConflictPolicy::Overwrite);
        let meta = VideoMetadata {
            id: "abc".to_string(),
            title: "Save $HOME money".to_string(),
            upload_date: None,
        };
        let descriptor = OutputArtifactDescriptor::describe(&url, &meta, &config);

        assert_eq!(
            descriptor.paths,
            vec![PathBuf::from("/out/50%/Save \u{FF04}HOME money [abc].mp3")]
        );
        let template = descriptor.output_template();
        assert!(!template.contains('$'));
        assert_eq!(
            template,
            Path::new("/out/50%%")
                .join("Save \u{FF04}HOME money [abc].%(ext)s")
                .to_string_lossy()
        );
    }

    #[test]
    fn test_subtitle_paths_follow_language_order() {
        let url = UrlEntry::new("https://youtu.be/UyqlT52hIO8").unwrap();
        let config = JobConfig::subtitles(
            ["en", "vi"],
            SubtitleFormat::Srt,
            "/out",
            ConflictPolicy::SkipIfExists,
        );
        let descriptor = OutputArtifactDescriptor::describe(&url, &metadata("Talk"), &config);

        assert_eq!(
            descriptor.paths,
            vec![
                PathBuf::from("/out/Talk [UyqlT52hIO8] - 2024-03-09.en.srt"),
                PathBuf::from("/out/Talk [UyqlT52hIO8] - 2024-03-09.vi.srt"),
            ]
        );
    }

    #[test]
    fn test_audio_path_and_template() {
        let url = UrlEntry::new("https://youtu.be/UyqlT52hIO8").unwrap();
        let config = JobConfig::audio(AudioCodec::Mp3, "192", "/out", ConflictPolicy::Overwrite);
        let descriptor = OutputArtifactDescriptor::describe(&url, &metadata("100% Focus"), &config);

        assert_eq!(
            descriptor.paths,
            vec![PathBuf::from("/out/100% Focus [UyqlT52hIO8] - 2024-03-09.mp3")]
        );
        assert_eq!(
            descriptor.output_template(),
            Path::new("/out")
                .join("100%% Focus [UyqlT52hIO8] - 2024-03-09.%(ext)s")
                .to_string_lossy()
        );
    }
}
