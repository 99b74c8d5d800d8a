use std::path::PathBuf;

/// Default filter when neither `RUST_LOG` nor an explicit level is given
pub const DEFAULT_LOG_FILTER: &str = "yt_toolkit=info";

pub fn resolve_log_dir() -> Result<PathBuf, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Failed to resolve current directory: {e}"))?;
    Ok(cwd.join("log"))
}

/// Build the filter directive. `RUST_LOG` wins, then an explicit level for
/// this crate, then the default.
pub fn filter_directive(level: Option<&str>) -> String {
    if let Ok(from_env) = std::env::var("RUST_LOG") {
        if !from_env.trim().is_empty() {
            return from_env;
        }
    }
    match level {
        Some(level) => format!("yt_toolkit={level}"),
        None => DEFAULT_LOG_FILTER.to_string(),
    }
}

pub fn init_tracing(level: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_new(filter_directive(level))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    #[cfg(feature = "local-logging")]
    {
        use std::sync::OnceLock;
        use tracing_appender::non_blocking::WorkerGuard;

        static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

        let log_dir = match resolve_log_dir() {
            Ok(dir) => dir,
            Err(err) => {
                eprintln!("{err}");
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .try_init();
                return;
            }
        };

        if let Err(err) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create log directory: {err}");
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            return;
        }

        let file_appender = tracing_appender::rolling::never(&log_dir, "toolkit.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .with_ansi(false)
            .try_init();
        return;
    }

    #[cfg(not(feature = "local-logging"))]
    {
        // stdout belongs to the shell and the summaries
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
