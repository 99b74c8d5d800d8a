use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use yt_toolkit::commands::{
    collect_urls, download_subtitles, extract_audio, scan_subtitles, scan_summary, unusable_lists,
    AudioRequest, CollectRequest, SubtitleOptions, SubtitleRequest, UrlSource,
};
use yt_toolkit::shell::Shell;
use yt_toolkit::{
    summarize, AppConfig, AppState, AudioCodec, CollectMode, ConflictPolicy, JobResult,
    JobStatus, JobSummary, SubtitleFormat, YtDlpRunner,
};

/// Exit status when at least one URL failed
const EXIT_FAILURES: u8 = 3;
/// Exit status when a run could not start
const EXIT_PREFLIGHT: u8 = 1;

#[derive(Parser)]
#[command(name = "yt-toolkit")]
#[command(about = "Batch YouTube subtitle download, audio extraction and URL collection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(flatten)]
    tools: ToolArgs,
}

/// Overrides for the yt-dlp invocation
#[derive(Args)]
struct ToolArgs {
    /// yt-dlp binary
    #[arg(long, global = true)]
    ytdlp: Option<PathBuf>,

    /// Folder containing ffmpeg and ffprobe
    #[arg(long, global = true)]
    ffmpeg_location: Option<PathBuf>,

    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Borrow cookies from a browser profile (chrome, firefox, ...)
    #[arg(long, global = true)]
    cookies_from_browser: Option<String>,

    /// Browser impersonation target
    #[arg(long, global = true)]
    impersonate: Option<String>,

    #[arg(long, global = true)]
    force_ipv4: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Collect the video URLs of a playlist or channel into a URL list
    Collect {
        /// Playlist or channel URL
        url: String,

        /// Folder receiving the URL list
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// Rewrite the list instead of adding new URLs on top
        #[arg(long)]
        replace: bool,
    },

    /// Download subtitles for a video URL or every URL of a list file
    Subs {
        /// Video URL or URL list file
        source: Option<String>,

        #[arg(short, long)]
        outdir: Option<PathBuf>,

        #[command(flatten)]
        subtitles: SubtitleArgs,
    },

    /// Extract audio for a video URL or every URL of a list file
    Audio {
        /// Video URL or URL list file
        source: Option<String>,

        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// mp3, m4a, opus, wav or flac
        #[arg(short, long)]
        codec: Option<AudioCodec>,

        /// Bitrate in kbps
        #[arg(short, long)]
        quality: Option<String>,

        #[arg(long)]
        force_overwrite: bool,
    },

    /// Find URL lists under a folder and download subtitles next to each
    Scan {
        /// Folder to search, or a single list file
        path: PathBuf,

        #[command(flatten)]
        subtitles: SubtitleArgs,
    },

    /// Interactive menu (the default)
    Shell,
}

#[derive(Args)]
struct SubtitleArgs {
    /// Comma separated language codes, e.g. vi,en
    #[arg(short, long, value_delimiter = ',')]
    languages: Vec<String>,

    /// vtt or srt
    #[arg(short, long)]
    format: Option<SubtitleFormat>,

    /// Shortcut for --format srt
    #[arg(long, conflicts_with = "format")]
    srt: bool,

    /// Skip auto-generated captions
    #[arg(long)]
    uploaded_only: bool,

    #[arg(long)]
    force_overwrite: bool,
}

impl SubtitleArgs {
    fn into_options(self) -> SubtitleOptions {
        SubtitleOptions {
            languages: self.languages,
            format: if self.srt {
                Some(SubtitleFormat::Srt)
            } else {
                self.format
            },
            policy: self.force_overwrite.then_some(ConflictPolicy::Overwrite),
            uploaded_only: self.uploaded_only,
        }
    }
}

impl Command {
    /// The shell blocks on stdin, so Ctrl+C keeps its default behaviour there
    fn cancels_on_interrupt(&self) -> bool {
        !matches!(self, Command::Shell)
    }
}

impl ToolArgs {
    fn apply(self, config: &mut AppConfig) {
        let tools = &mut config.tools;
        if let Some(path) = self.ytdlp {
            tools.ytdlp_path = path;
        }
        if self.ffmpeg_location.is_some() {
            tools.ffmpeg_location = self.ffmpeg_location;
        }
        if self.proxy.is_some() {
            tools.proxy = self.proxy;
        }
        if self.cookies_from_browser.is_some() {
            tools.cookies_from_browser = self.cookies_from_browser;
        }
        if self.impersonate.is_some() {
            tools.impersonate = self.impersonate;
        }
        tools.force_ipv4 |= self.force_ipv4;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = AppConfig::open(cli.config.as_deref());
    let level = cli.log_level.clone().or_else(|| {
        loaded
            .as_ref()
            .ok()
            .map(|config| config.advanced.log_level.clone())
    });
    yt_toolkit::utils::logging::init_tracing(level.as_deref());

    let mut config = loaded.unwrap_or_else(|e| {
        warn!("⚠️ Using default configuration: {:#}", e);
        AppConfig::default()
    });
    cli.tools.apply(&mut config);

    info!("🚀 Starting {} v{}", yt_toolkit::NAME, yt_toolkit::VERSION);

    let runner = YtDlpRunner::new(config.tools.clone());
    let command = cli.command.unwrap_or(Command::Shell);

    if let Err(e) = runner.check_available().await {
        match command {
            Command::Shell => warn!("⚠️ {}", e),
            _ => {
                error!("❌ {}", e);
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_PREFLIGHT);
            }
        }
    }

    let state =
        AppState::with_runner(config, Arc::new(runner)).with_progress(Arc::new(print_progress));

    if command.cancels_on_interrupt() {
        let cancel = state.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⏹️ Interrupt received, stopping after the current URL");
                cancel.cancel();
            }
        });
    }

    run(command, &state).await
}

async fn run(command: Command, state: &AppState) -> ExitCode {
    let default_source = state.config.defaults.url_file_name.clone();

    match command {
        Command::Shell => {
            let stdin = std::io::stdin();
            let mut shell = Shell::new(state, stdin.lock(), std::io::stdout());
            match shell.run().await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("❌ Shell I/O error: {}", e);
                    ExitCode::from(EXIT_PREFLIGHT)
                }
            }
        }
        Command::Collect {
            url,
            outdir,
            replace,
        } => {
            let request = CollectRequest {
                source_url: url,
                out_dir: outdir,
                mode: if replace {
                    CollectMode::Replace
                } else {
                    CollectMode::Prepend
                },
            };
            match collect_urls(state, request).await {
                Ok(outcome) => {
                    println!(
                        "Found {} URL(s), {} new, saved to {}",
                        outcome.found,
                        outcome.added,
                        outcome.url_file.display()
                    );
                    if let Some(backup) = outcome.backup {
                        println!("Previous list backed up to {}", backup.display());
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => preflight_failure(&e),
            }
        }
        Command::Subs {
            source,
            outdir,
            subtitles,
        } => {
            let Some(source) = parse_source(source, &default_source) else {
                return preflight_failure("no URL or URL list given");
            };
            let request = SubtitleRequest {
                source,
                output_dir: outdir,
                options: subtitles.into_options(),
            };
            finish(download_subtitles(state, request).await)
        }
        Command::Audio {
            source,
            outdir,
            codec,
            quality,
            force_overwrite,
        } => {
            let Some(source) = parse_source(source, &default_source) else {
                return preflight_failure("no URL or URL list given");
            };
            let request = AudioRequest {
                source,
                output_dir: outdir,
                codec,
                quality,
                policy: force_overwrite.then_some(ConflictPolicy::Overwrite),
            };
            finish(extract_audio(state, request).await)
        }
        Command::Scan { path, subtitles } => {
            match scan_subtitles(state, path, subtitles.into_options()).await {
                Ok(reports) => {
                    for report in unusable_lists(&reports) {
                        let error = report.error.as_deref().unwrap_or_default();
                        eprintln!("Skipped {}: {}", report.url_file.display(), error);
                    }
                    let all_usable = unusable_lists(&reports).next().is_none();
                    report_summary(scan_summary(&reports), all_usable)
                }
                Err(e) => preflight_failure(&e),
            }
        }
    }
}

fn parse_source(source: Option<String>, default_source: &str) -> Option<UrlSource> {
    UrlSource::parse(source.as_deref().unwrap_or(default_source))
}

fn print_progress(index: usize, total: usize, result: &JobResult) {
    let status = match result.status {
        JobStatus::Succeeded => "OK  ",
        JobStatus::Skipped => "SKIP",
        JobStatus::Failed => "FAIL",
    };
    match &result.detail {
        Some(detail) => println!("[{}/{}] {} {} ({})", index, total, status, result.url, detail),
        None => println!("[{}/{}] {} {}", index, total, status, result.url),
    }
}

fn finish(result: Result<Vec<JobResult>, String>) -> ExitCode {
    match result {
        Ok(results) => report_summary(summarize(&results), true),
        Err(e) => preflight_failure(&e),
    }
}

fn report_summary(summary: JobSummary, all_lists_usable: bool) -> ExitCode {
    println!("{}", summary.render());
    if summary.is_clean() && all_lists_usable {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURES)
    }
}

fn preflight_failure(message: &str) -> ExitCode {
    eprintln!("Error: {}", message);
    ExitCode::from(EXIT_PREFLIGHT)
}
