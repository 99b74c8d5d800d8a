//! yt-dlp integration
//!
//! All network access, format selection and transcoding is delegated to the
//! `yt-dlp` binary (which drives `ffmpeg` for conversions). This module builds
//! its command lines and interprets exit status and diagnostics. The
//! [`ToolRunner`] trait is the seam the acquisition job talks to, so runs can
//! be exercised without the real binary.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::core::artifacts::OutputArtifactDescriptor;
use crate::core::models::{AppError, AppResult, TargetKind, VideoMetadata};

/// Format selector for audio extraction, best candidates first
pub const AUDIO_FORMAT_SELECTOR: &str = "bestaudio[ext=m4a]/bestaudio[acodec^=opus]/bestaudio/best";

/// Number of stderr lines kept for failure details
const STDERR_TAIL_LINES: usize = 20;

/// Options shared by every yt-dlp invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolOptions {
    /// Binary name or path
    pub ytdlp_path: PathBuf,
    /// Directory holding ffmpeg/ffprobe, when not on PATH
    pub ffmpeg_location: Option<PathBuf>,
    pub force_ipv4: bool,
    pub proxy: Option<String>,
    /// Browser to borrow cookies from ("chrome", "firefox", ...)
    pub cookies_from_browser: Option<String>,
    /// Browser impersonation target
    pub impersonate: Option<String>,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            ytdlp_path: PathBuf::from(if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" }),
            ffmpeg_location: None,
            force_ipv4: false,
            proxy: None,
            cookies_from_browser: None,
            impersonate: None,
        }
    }
}

/// One acquisition call for one URL
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub kind: &'a TargetKind,
    pub descriptor: &'a OutputArtifactDescriptor,
    pub overwrite: bool,
}

/// Exit status and trailing diagnostics of a finished invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr_tail: Vec<String>,
}

impl ToolOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stderr_tail: Vec::new(),
        }
    }

    pub fn failed(exit_code: Option<i32>, stderr: &str) -> Self {
        Self {
            success: false,
            exit_code,
            stderr_tail: stderr.lines().map(str::to_string).collect(),
        }
    }

    /// Human-readable reason for a failed invocation.
    ///
    /// Prefers the last `ERROR:` line, then the last non-empty stderr line,
    /// then the exit code.
    pub fn failure_detail(&self) -> String {
        let lines = || self.stderr_tail.iter().map(|l| l.trim()).filter(|l| !l.is_empty());

        if let Some(error) = lines().filter_map(|l| l.strip_prefix("ERROR:")).last() {
            return error.trim().to_string();
        }
        if let Some(last) = lines().last() {
            return last.to_string();
        }
        match self.exit_code {
            Some(code) => format!("yt-dlp exited with code {}", code),
            None => "yt-dlp was terminated by a signal".to_string(),
        }
    }
}

/// Seam between the acquisition job and the external tool
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Resolve id, title and upload date without downloading
    async fn probe(&self, url: &str) -> AppResult<VideoMetadata>;

    /// Run the acquisition. `Err` means the tool could not be run at all.
    async fn fetch(&self, request: &FetchRequest<'_>) -> AppResult<ToolOutcome>;

    /// Flat-list the videos of a playlist or channel as watch URLs
    async fn list_entries(&self, url: &str) -> AppResult<Vec<String>>;
}

/// [`ToolRunner`] backed by the real `yt-dlp` binary
#[derive(Debug, Clone, Default)]
pub struct YtDlpRunner {
    options: ToolOptions,
}

impl YtDlpRunner {
    pub fn new(options: ToolOptions) -> Self {
        Self { options }
    }

    /// Pre-flight check that the binary can be executed, returning its version
    pub async fn check_available(&self) -> AppResult<String> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(AppError::Tool(format!(
                "{} --version exited with {}",
                self.options.ytdlp_path.display(),
                output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("🔧 Using yt-dlp {}", version);
        Ok(version)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.options.ytdlp_path);
        command.stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> AppError {
        AppError::Tool(format!(
            "Failed to run {}: {}",
            self.options.ytdlp_path.display(),
            e
        ))
    }
}

#[async_trait]
impl ToolRunner for YtDlpRunner {
    async fn probe(&self, url: &str) -> AppResult<VideoMetadata> {
        debug!("🔍 Probing metadata for {}", url);
        let output = self
            .command()
            .args(build_probe_args(&self.options, url))
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let outcome =
                ToolOutcome::failed(output.status.code(), &String::from_utf8_lossy(&output.stderr));
            return Err(AppError::Tool(outcome.failure_detail()));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        let first_line = json_str.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let json_value: serde_json::Value = serde_json::from_str(first_line)
            .map_err(|e| AppError::Parse(format!("Failed to parse yt-dlp output: {}", e)))?;

        parse_metadata_json(&json_value)
    }

    async fn fetch(&self, request: &FetchRequest<'_>) -> AppResult<ToolOutcome> {
        let args = build_fetch_args(&self.options, request);
        debug!("▶️ yt-dlp {}", args.join(" "));

        let mut child = self
            .command()
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let relay_stdout = async move {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("yt-dlp: {}", line);
                }
            }
        };

        let collect_stderr = async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if line.starts_with("ERROR:") {
                        warn!("yt-dlp: {}", line);
                    } else {
                        debug!("yt-dlp: {}", line);
                    }
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            tail
        };

        let ((), tail) = tokio::join!(relay_stdout, collect_stderr);
        let status = child.wait().await?;

        Ok(ToolOutcome {
            success: status.success(),
            exit_code: status.code(),
            stderr_tail: tail.into_iter().collect(),
        })
    }

    async fn list_entries(&self, url: &str) -> AppResult<Vec<String>> {
        info!("📋 Listing videos of {}", url);
        let output = self
            .command()
            .args(build_list_args(&self.options, url))
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let outcome =
                ToolOutcome::failed(output.status.code(), &String::from_utf8_lossy(&output.stderr));
            return Err(AppError::Tool(outcome.failure_detail()));
        }

        Ok(parse_playlist_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn push_common_args(options: &ToolOptions, args: &mut Vec<String>) {
    if let Some(ffmpeg) = &options.ffmpeg_location {
        args.push("--ffmpeg-location".into());
        args.push(ffmpeg.to_string_lossy().into_owned());
    }
    if options.force_ipv4 {
        args.push("--force-ipv4".into());
    }
    if let Some(proxy) = &options.proxy {
        args.push("--proxy".into());
        args.push(proxy.clone());
    }
    if let Some(browser) = &options.cookies_from_browser {
        args.push("--cookies-from-browser".into());
        args.push(browser.clone());
    }
    if let Some(target) = &options.impersonate {
        args.push("--impersonate".into());
        args.push(target.clone());
    }
}

pub fn build_probe_args(options: &ToolOptions, url: &str) -> Vec<String> {
    let mut args: Vec<String> = ["--dump-json", "--no-warnings", "--no-playlist", "--skip-download"]
        .into_iter()
        .map(String::from)
        .collect();
    push_common_args(options, &mut args);
    args.push("--".into());
    args.push(url.to_string());
    args
}

pub fn build_list_args(options: &ToolOptions, url: &str) -> Vec<String> {
    let mut args: Vec<String> = ["--flat-playlist", "--dump-json", "--no-warnings"]
        .into_iter()
        .map(String::from)
        .collect();
    push_common_args(options, &mut args);
    args.push("--".into());
    args.push(url.to_string());
    args
}

pub fn build_fetch_args(options: &ToolOptions, request: &FetchRequest<'_>) -> Vec<String> {
    let mut args: Vec<String> = vec!["--no-playlist".into(), "--newline".into()];

    match request.kind {
        TargetKind::Subtitles {
            languages,
            format,
            include_auto_generated,
        } => {
            args.push("--skip-download".into());
            args.push("--write-subs".into());
            if *include_auto_generated {
                args.push("--write-auto-subs".into());
            }
            args.push("--sub-langs".into());
            args.push(languages.join(","));
            args.push("--sub-format".into());
            args.push(format!("{}/best", format.extension()));
            args.push("--convert-subs".into());
            args.push(format.extension().into());
        }
        TargetKind::Audio { codec, quality } => {
            args.push("-f".into());
            args.push(AUDIO_FORMAT_SELECTOR.into());
            args.push("-x".into());
            args.push("--audio-format".into());
            args.push(codec.as_str().into());
            args.push("--audio-quality".into());
            args.push(format!("{}K", quality));
        }
    }

    args.push(if request.overwrite {
        "--force-overwrites".into()
    } else {
        "--no-overwrites".into()
    });

    push_common_args(options, &mut args);

    args.push("-o".into());
    args.push(request.descriptor.output_template());
    args.push("--".into());
    args.push(request.url.to_string());
    args
}

/// Map one `--dump-json` document to [`VideoMetadata`]
pub fn parse_metadata_json(json: &serde_json::Value) -> AppResult<VideoMetadata> {
    let id = json["id"]
        .as_str()
        .ok_or_else(|| AppError::Parse("Missing video ID in yt-dlp output".to_string()))?
        .to_string();

    let title = json["title"].as_str().unwrap_or("unknown").to_string();

    let upload_date = json["upload_date"]
        .as_str()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok());

    Ok(VideoMetadata {
        id,
        title,
        upload_date,
    })
}

/// Map `--flat-playlist --dump-json` lines to watch URLs, skipping entries without id
pub fn parse_playlist_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter_map(|json| json["id"].as_str().map(watch_url))
        .collect()
}

pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}
