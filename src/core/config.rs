//! Application configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::models::{AudioCodec, ConflictPolicy, SubtitleFormat};
use super::url_store::DEFAULT_URL_FILE_NAME;
use super::ytdlp::ToolOptions;
use crate::utils::validation::is_valid_language_code;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Main application configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolOptions,
    pub subtitles: SubtitleConfig,
    pub audio: AudioConfig,
    pub defaults: DefaultsConfig,
    pub advanced: AdvancedConfig,
}

/// Subtitle download defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubtitleConfig {
    pub languages: Vec<String>,
    pub format: SubtitleFormat,
    pub include_auto_generated: bool,
}

/// Audio extraction defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AudioConfig {
    pub codec: String, // "mp3", "m4a", "opus", "wav", "flac"
    pub quality: String,
}

/// Defaults shared by every run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultsConfig {
    pub output_dir: PathBuf,
    pub policy: ConflictPolicy,
    pub url_file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdvancedConfig {
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            languages: vec!["vi".to_string(), "en".to_string()],
            format: SubtitleFormat::Vtt,
            include_auto_generated: true,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            codec: AudioCodec::Mp3.as_str().to_string(),
            quality: "192".to_string(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloads"),
            policy: ConflictPolicy::SkipIfExists,
            url_file_name: DEFAULT_URL_FILE_NAME.to_string(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file, creating default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;

        tracing::info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    /// Load from `path`, or from the platform location when `None`. A
    /// missing file is created with the defaults.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from(path),
            Some(path) => {
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            None => Self::load(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Saved configuration to: {:?}", path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "yttoolkit", "yt-toolkit")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    pub fn audio_codec(&self) -> Result<AudioCodec> {
        self.audio
            .codec
            .parse()
            .with_context(|| format!("Invalid audio codec: {}", self.audio.codec))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.tools.ytdlp_path.as_os_str().is_empty() {
            anyhow::bail!("yt-dlp path must not be empty");
        }

        if let Some(ref proxy) = self.tools.proxy {
            if !proxy.contains("://") {
                anyhow::bail!("Proxy must include a scheme, e.g. http://host:port");
            }
        }

        if self.subtitles.languages.is_empty() {
            anyhow::bail!("At least one subtitle language is required");
        }

        if let Some(bad) = self
            .subtitles
            .languages
            .iter()
            .find(|l| !is_valid_language_code(l.trim()))
        {
            anyhow::bail!("Invalid subtitle language code: {}", bad);
        }

        self.audio_codec()?;

        let quality = &self.audio.quality;
        if quality.is_empty() || !quality.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Audio quality must be a bitrate in kbps: {}", self.audio.quality);
        }

        if self.defaults.url_file_name.trim().is_empty() {
            anyhow::bail!("URL file name must not be empty");
        }

        if !LOG_LEVELS.contains(&self.advanced.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        Ok(())
    }
}
