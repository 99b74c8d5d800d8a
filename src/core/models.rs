//! Core data models for the acquisition toolkit

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::validation::is_valid_language_code;

/// A single video identifier to process, normally a full URL.
///
/// Always trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlEntry(String);

impl UrlEntry {
    /// Build an entry from raw text, returning `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UrlEntry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Subtitle container written to disk

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Vtt,

    Srt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Vtt => "vtt",
            SubtitleFormat::Srt => "srt",
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vtt" => Ok(SubtitleFormat::Vtt),
            "srt" => Ok(SubtitleFormat::Srt),
            other => Err(AppError::Validation(format!(
                "Unsupported subtitle format: {}",
                other
            ))),
        }
    }
}

/// Audio codec produced by the transcoder

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Mp3,

    M4a,

    Opus,

    Wav,

    Flac,
}

impl AudioCodec {
    pub const ALL: [AudioCodec; 5] = [
        AudioCodec::Mp3,
        AudioCodec::M4a,
        AudioCodec::Opus,
        AudioCodec::Wav,
        AudioCodec::Flac,
    ];

    /// Name understood by `--audio-format`, which is also the file extension
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::M4a => "m4a",
            AudioCodec::Opus => "opus",
            AudioCodec::Wav => "wav",
            AudioCodec::Flac => "flac",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for AudioCodec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AudioCodec::ALL
            .into_iter()
            .find(|codec| codec.as_str() == wanted)
            .ok_or_else(|| AppError::Validation(format!("Unsupported audio codec: {}", s)))
    }
}

/// What a run acquires for every URL

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetKind {
    Subtitles {
        /// Ordered, de-duplicated language codes
        languages: Vec<String>,

        format: SubtitleFormat,

        /// Fall back to auto-generated captions when no uploaded track exists
        include_auto_generated: bool,
    },

    Audio {
        codec: AudioCodec,

        /// Bitrate hint in kbps ("128", "192", "320", ...)
        quality: String,
    },
}

impl TargetKind {
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::Subtitles { .. } => "subtitles",
            TargetKind::Audio { .. } => "audio",
        }
    }
}

/// Rule for handling pre-existing output files

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    #[default]
    SkipIfExists,

    Overwrite,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::SkipIfExists => f.write_str("skip if exists"),
            ConflictPolicy::Overwrite => f.write_str("force overwrite"),
        }
    }
}

/// Immutable parameters governing one acquisition run

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobConfig {
    pub kind: TargetKind,

    pub output_dir: PathBuf,

    pub policy: ConflictPolicy,
}

impl JobConfig {
    /// Subtitle run. Language codes are trimmed and de-duplicated in order.
    pub fn subtitles<I, S>(
        languages: I,
        format: SubtitleFormat,
        output_dir: impl Into<PathBuf>,
        policy: ConflictPolicy,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            kind: TargetKind::Subtitles {
                languages: normalize_languages(languages),
                format,
                include_auto_generated: true,
            },
            output_dir: output_dir.into(),
            policy,
        }
    }

    /// Audio extraction run
    pub fn audio(
        codec: AudioCodec,
        quality: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        policy: ConflictPolicy,
    ) -> Self {
        Self {
            kind: TargetKind::Audio {
                codec,
                quality: quality.into(),
            },
            output_dir: output_dir.into(),
            policy,
        }
    }

    /// Only consult uploaded subtitle tracks, never auto-generated captions
    pub fn without_auto_generated(mut self) -> Self {
        if let TargetKind::Subtitles {
            include_auto_generated,
            ..
        } = &mut self.kind
        {
            *include_auto_generated = false;
        }
        self
    }

    /// Same settings, different output directory
    pub fn with_output_dir(&self, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(AppError::Validation(
                "Output directory must not be empty".to_string(),
            ));
        }

        // yt-dlp expands `$VAR` and a leading `~` in its output template
        let dir = self.output_dir.to_string_lossy();
        if dir.contains('$') || dir.starts_with('~') {
            return Err(AppError::Validation(format!(
                "Output directory must not contain '$' or start with '~': {}",
                dir
            )));
        }

        match &self.kind {
            TargetKind::Subtitles { languages, .. } => {
                if languages.is_empty() {
                    return Err(AppError::Validation(
                        "At least one subtitle language is required".to_string(),
                    ));
                }
                if let Some(bad) = languages.iter().find(|l| !is_valid_language_code(l)) {
                    return Err(AppError::Validation(format!(
                        "Invalid language code: {}",
                        bad
                    )));
                }
            }
            TargetKind::Audio { quality, .. } => {
                if quality.is_empty() || !quality.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AppError::Validation(format!(
                        "Audio quality must be a bitrate in kbps, got '{}'",
                        quality
                    )));
                }
            }
        }

        Ok(())
    }
}

pub(crate) fn normalize_languages<I, S>(languages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for lang in languages {
        let lang = lang.as_ref().trim();
        if !lang.is_empty() && !normalized.iter().any(|l| l == lang) {
            normalized.push(lang.to_string());
        }
    }
    normalized
}

/// Metadata reported by the external tool for one video

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoMetadata {
    pub id: String,

    pub title: String,

    pub upload_date: Option<NaiveDate>,
}

/// Per-URL outcome

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Succeeded,

    Skipped,

    Failed,
}

/// Per-URL outcome record

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobResult {
    pub url: UrlEntry,

    pub status: JobStatus,

    pub detail: Option<String>,

    /// Expected output files for this URL, empty when metadata could not be probed
    pub artifacts: Vec<PathBuf>,
}

impl JobResult {
    pub fn succeeded(url: UrlEntry, artifacts: Vec<PathBuf>) -> Self {
        Self {
            url,
            status: JobStatus::Succeeded,
            detail: None,
            artifacts,
        }
    }

    pub fn skipped(url: UrlEntry, artifacts: Vec<PathBuf>) -> Self {
        Self {
            url,
            status: JobStatus::Skipped,
            detail: Some("all expected files already exist".to_string()),
            artifacts,
        }
    }

    pub fn failed(url: UrlEntry, detail: impl Into<String>, artifacts: Vec<PathBuf>) -> Self {
        Self {
            url,
            status: JobStatus::Failed,
            detail: Some(detail.into()),
            artifacts,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Application error types

#[derive(Debug, thiserror::Error)]

pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("yt-dlp error: {0}")]
    Tool(String),
}

/// Result type alias for application operations

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_entry_rejects_blank() {
        assert!(UrlEntry::new("").is_none());
        assert!(UrlEntry::new("   \t").is_none());
        assert_eq!(UrlEntry::new("  vid1 ").unwrap().as_str(), "vid1");
    }

    #[test]
    fn test_subtitle_languages_are_deduplicated_in_order() {
        let config = JobConfig::subtitles(
            ["en", " vi", "en", ""],
            SubtitleFormat::Vtt,
            "out",
            ConflictPolicy::SkipIfExists,
        );
        match config.kind {
            TargetKind::Subtitles { languages, .. } => assert_eq!(languages, vec!["en", "vi"]),
            _ => panic!("expected subtitles"),
        }
    }

    #[test]
    fn test_validate_rejects_empty_language_set() {
        let config = JobConfig::subtitles(
            Vec::<String>::new(),
            SubtitleFormat::Srt,
            "out",
            ConflictPolicy::Overwrite,
        );
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_audio_quality() {
        let ok = JobConfig::audio(AudioCodec::Mp3, "192", "out", ConflictPolicy::SkipIfExists);
        assert!(ok.validate().is_ok());

        let bad = JobConfig::audio(AudioCodec::Mp3, "high", "out", ConflictPolicy::SkipIfExists);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_expandable_output_dir() {
        for dir in ["music/$HOME", "~/music"] {
            let config = JobConfig::audio(AudioCodec::Mp3, "192", dir, ConflictPolicy::Overwrite);
            assert!(matches!(config.validate(), Err(AppError::Validation(_))), "{}", dir);
        }
        let config =
            JobConfig::audio(AudioCodec::Mp3, "192", "music/50%", ConflictPolicy::Overwrite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_codec_parsing() {
        assert_eq!("MP3".parse::<AudioCodec>().unwrap(), AudioCodec::Mp3);
        assert_eq!("flac".parse::<AudioCodec>().unwrap(), AudioCodec::Flac);
        assert!("aac".parse::<AudioCodec>().is_err());
        assert_eq!("srt".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Srt);
    }

    #[test]
    fn test_without_auto_generated() {
        let config =
            JobConfig::subtitles(["vi"], SubtitleFormat::Vtt, "out", ConflictPolicy::SkipIfExists)
                .without_auto_generated();
        assert!(matches!(
            config.kind,
            TargetKind::Subtitles {
                include_auto_generated: false,
                ..
            }
        ));
    }
}
