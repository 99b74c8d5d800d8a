//! Interactive menu shell
//!
//! Started when the binary runs without a subcommand. Every prompt offers the
//! configured default, and each run ends with the summary of its results.

pub mod prompts;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::commands::{
    collect_urls, download_subtitles, extract_audio, scan_subtitles, scan_summary, AudioRequest,
    CollectRequest, SubtitleOptions, SubtitleRequest, UrlSource,
};
use crate::core::collector::CollectMode;
use crate::core::models::{AudioCodec, ConflictPolicy, JobResult, SubtitleFormat};
use crate::core::reporter::summarize;
use crate::AppState;
use prompts::{parse_language_list, Prompter};

const MENU: [&str; 4] = [
    "Collect video URLs from a playlist or channel",
    "Download subtitles",
    "Extract audio",
    "Scan folders for URL lists and download subtitles",
];

enum Flow {
    Continue,
    Quit,
}

/// `Some(value)` or leave the current action at end of input
macro_rules! answer {
    ($e:expr) => {
        match $e? {
            Some(value) => value,
            None => return Ok(Flow::Quit),
        }
    };
}

pub struct Shell<'a, R, W> {
    state: &'a AppState,
    prompter: Prompter<R, W>,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(state: &'a AppState, input: R, output: W) -> Self {
        Self {
            state,
            prompter: Prompter::new(input, output),
        }
    }

    pub fn into_output(self) -> W {
        self.prompter.into_inner().1
    }

    /// Show the menu until the user quits or input ends
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            if self.state.cancel.is_cancelled() {
                self.prompter.say("Interrupted.")?;
                return Ok(());
            }

            let title = format!("{} v{}", crate::NAME, crate::VERSION);
            let flow = match self.prompter.select(&title, &MENU, "Quit")? {
                None | Some(0) => Flow::Quit,
                Some(1) => self.collect().await?,
                Some(2) => self.subtitles().await?,
                Some(3) => self.audio().await?,
                Some(_) => self.scan().await?,
            };

            if let Flow::Quit = flow {
                self.prompter.say("Bye.")?;
                return Ok(());
            }
        }
    }

    async fn collect(&mut self) -> io::Result<Flow> {
        let state = self.state;
        let defaults = &state.config.defaults;
        let source_url = answer!(self.prompter.prompt("Playlist or channel URL", None));
        if source_url.is_empty() {
            self.prompter.say("No URL given.")?;
            return Ok(Flow::Continue);
        }
        let out_dir = answer!(self.prompter.prompt(
            &format!("Folder for {}", defaults.url_file_name),
            Some(&*defaults.output_dir.to_string_lossy()),
        ));
        let replace = answer!(self.prompter.confirm(
            "Replace the existing list instead of adding new URLs on top?",
            false,
        ));

        let request = CollectRequest {
            source_url,
            out_dir: Some(PathBuf::from(out_dir)),
            mode: if replace {
                CollectMode::Replace
            } else {
                CollectMode::Prepend
            },
        };

        match collect_urls(self.state, request).await {
            Ok(outcome) => {
                let mut text = format!(
                    "Found {} URL(s), {} new, saved to {}",
                    outcome.found,
                    outcome.added,
                    outcome.url_file.display()
                );
                if let Some(backup) = &outcome.backup {
                    text.push_str(&format!("\nPrevious list backed up to {}", backup.display()));
                }
                self.prompter.say(&text)?;
            }
            Err(e) => self.prompter.say(&format!("Error: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    async fn subtitles(&mut self) -> io::Result<Flow> {
        let Some(source) = answer!(self.ask_source()) else {
            return Ok(Flow::Continue);
        };
        let options = answer!(self.ask_subtitle_options());
        let output_dir = answer!(self.ask_output_dir());

        let request = SubtitleRequest {
            source,
            output_dir: Some(output_dir),
            options,
        };
        let result = download_subtitles(self.state, request).await;
        self.report(result)?;
        Ok(Flow::Continue)
    }

    async fn audio(&mut self) -> io::Result<Flow> {
        let Some(source) = answer!(self.ask_source()) else {
            return Ok(Flow::Continue);
        };

        let state = self.state;
        let audio = &state.config.audio;
        let codec_names: Vec<&str> = AudioCodec::ALL.iter().map(|c| c.as_str()).collect();
        let codec = loop {
            let answer = answer!(self.prompter.prompt(
                &format!("Codec ({})", codec_names.join("/")),
                Some(audio.codec.as_str()),
            ));
            match answer.parse::<AudioCodec>() {
                Ok(codec) => break codec,
                Err(e) => self.prompter.say(&e.to_string())?,
            }
        };
        let quality = answer!(self
            .prompter
            .prompt("Bitrate in kbps", Some(audio.quality.as_str())));
        let output_dir = answer!(self.ask_output_dir());
        let policy = answer!(self.ask_policy());

        let request = AudioRequest {
            source,
            output_dir: Some(output_dir),
            codec: Some(codec),
            quality: Some(quality),
            policy: Some(policy),
        };
        let result = extract_audio(self.state, request).await;
        self.report(result)?;
        Ok(Flow::Continue)
    }

    async fn scan(&mut self) -> io::Result<Flow> {
        let root = answer!(self.prompter.prompt("Folder to scan", Some(".")));
        let options = answer!(self.ask_subtitle_options());

        match scan_subtitles(self.state, PathBuf::from(root), options).await {
            Ok(reports) => {
                for report in &reports {
                    let line = match &report.error {
                        Some(error) => format!("{}: skipped, {}", report.url_file.display(), error),
                        None => {
                            let summary = summarize(&report.results);
                            format!(
                                "{}: {} succeeded, {} skipped, {} failed",
                                report.url_file.display(),
                                summary.succeeded,
                                summary.skipped,
                                summary.failed
                            )
                        }
                    };
                    self.prompter.say(&line)?;
                }
                if reports.is_empty() {
                    self.prompter.say(&format!(
                        "No {} files found.",
                        self.state.config.defaults.url_file_name
                    ))?;
                }
                self.prompter.say(&scan_summary(&reports).render())?;
            }
            Err(e) => self.prompter.say(&format!("Error: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    /// `Some(None)` when the answer is blank
    fn ask_source(&mut self) -> io::Result<Option<Option<UrlSource>>> {
        let url_file = self.state.config.defaults.url_file_name.clone();
        let answer = self
            .prompter
            .prompt("Video URL or URL list file", Some(url_file.as_str()))?;
        let Some(answer) = answer else {
            return Ok(None);
        };

        let source = UrlSource::parse(&answer);
        if source.is_none() {
            self.prompter.say("No URL or file given.")?;
        }
        debug!("Shell source: {:?}", source);
        Ok(Some(source))
    }

    fn ask_subtitle_options(&mut self) -> io::Result<Option<SubtitleOptions>> {
        let state = self.state;
        let subtitles = &state.config.subtitles;
        let default_langs = subtitles.languages.join(",");
        let default_format = subtitles.format.extension();

        let languages = self
            .prompter
            .prompt("Languages", Some(default_langs.as_str()))?;
        let Some(languages) = languages else {
            return Ok(None);
        };
        let format = loop {
            let answer = self
                .prompter
                .prompt("Format (vtt/srt)", Some(default_format))?;
            let Some(answer) = answer else {
                return Ok(None);
            };
            match answer.parse::<SubtitleFormat>() {
                Ok(format) => break format,
                Err(e) => self.prompter.say(&e.to_string())?,
            }
        };
        let Some(policy) = self.ask_policy()? else {
            return Ok(None);
        };

        Ok(Some(SubtitleOptions {
            languages: parse_language_list(&languages),
            format: Some(format),
            policy: Some(policy),
            uploaded_only: false,
        }))
    }

    fn ask_output_dir(&mut self) -> io::Result<Option<PathBuf>> {
        let default = self.state.config.defaults.output_dir.to_string_lossy().into_owned();
        Ok(self
            .prompter
            .prompt("Output folder", Some(default.as_str()))?
            .map(PathBuf::from))
    }

    fn ask_policy(&mut self) -> io::Result<Option<ConflictPolicy>> {
        let default_overwrite = self.state.config.defaults.policy == ConflictPolicy::Overwrite;
        Ok(self
            .prompter
            .confirm("Overwrite existing files?", default_overwrite)?
            .map(|overwrite| {
                if overwrite {
                    ConflictPolicy::Overwrite
                } else {
                    ConflictPolicy::SkipIfExists
                }
            }))
    }

    fn report(&mut self, result: Result<Vec<JobResult>, String>) -> io::Result<()> {
        match result {
            Ok(results) => self.prompter.say(&summarize(&results).render()),
            Err(e) => self.prompter.say(&format!("Error: {}", e)),
        }
    }
}
