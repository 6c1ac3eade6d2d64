use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix of the daily log files.
pub const LOG_PREFIX: &str = "flashdoc";

/// Where and how to log.
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub dir: Utf8PathBuf,
    pub prefix: String,
    /// Debug level instead of info, unless `RUST_LOG` says otherwise
    pub debug: bool,
    /// Also log to stderr with ANSI colors
    pub console: bool,
    /// Write the log file as JSON lines
    pub json: bool,
}

impl LogOptions {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: LOG_PREFIX.to_string(),
            debug: false,
            console: false,
            json: false,
        }
    }
}

/// `RUST_LOG` if set, otherwise info or debug.
fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

fn ensure_log_dir(dir: &Utf8Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir))?;
    }
    Ok(())
}

/// Install the global subscriber: a daily-rolling file in `options.dir` and
/// optionally a console layer.
///
/// The returned guard must be held for the duration of the program, dropping
/// it flushes and stops the background writer.
pub fn setup_logging(options: &LogOptions) -> Result<WorkerGuard> {
    ensure_log_dir(&options.dir)?;

    let file_appender = rolling::daily(&options.dir, &options.prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer: Box<dyn Layer<Registry> + Send + Sync> = if options.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let console_layer = options.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(env_filter(options.debug))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}, json={}",
        options.dir,
        options.prefix,
        options.debug,
        options.console,
        options.json
    );

    Ok(guard)
}
