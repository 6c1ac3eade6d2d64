//! FlashDoc - save text as a file with automatic format detection.
//!
//! Command-line entry point. Reads a file (or stdin), runs it through the save
//! pipeline and writes the result below `--out`.
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Create the config directory and initialize logging (`<config-dir>/logs`)
//! 3. Load `settings.yaml` (+ `FLASHDOC_*` overrides) and `stats.yaml`
//! 4. Save the text through [`SaveOrchestrator`] with the filesystem sink
//! 5. Print the saved path, log the metrics summary
//!
//! `--stats` skips saving and prints the counters and recommendations.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use flashdoc::logging::{LogOptions, setup_logging};
use flashdoc::models::Stats;
use flashdoc::services::{
    FilesystemDownloadSink, LogNotificationSink, StaticSelection, recommendations,
};
use flashdoc::{
    APP_NAME, AppState, ConfigManager, FormatTag, Metrics, SaveOrchestrator, StateManager, VERSION,
};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[command(name = "flashdoc", version, about = "Save text as a file with automatic format detection")]
struct Cli {
    /// File to save; reads stdin when omitted
    file: Option<Utf8PathBuf>,

    /// Output format, or `auto` to detect it
    #[arg(short, long, default_value = "auto")]
    format: FormatTag,

    /// Directory the configured folder path is resolved against
    #[arg(short, long, default_value = ".")]
    out: Utf8PathBuf,

    /// Directory holding settings.yaml, stats.yaml and logs
    #[arg(long, default_value = "FlashDoc Data")]
    config_dir: Utf8PathBuf,

    /// Debug logging, also echoed to stderr
    #[arg(long)]
    debug: bool,

    /// Write the log file as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print usage statistics and recommendations instead of saving
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;

    let mut log_options = LogOptions::new(config_manager.config_dir().join("logs"));
    log_options.debug = cli.debug;
    log_options.console = cli.debug;
    log_options.json = cli.json_logs;
    let _guard = setup_logging(&log_options)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("flashdoc-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run(cli, config_manager))
}

async fn run(cli: Cli, config_manager: ConfigManager) -> Result<()> {
    let settings = config_manager.load_settings()?;
    let stats = config_manager.load_stats().unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable stats: {:#}", e);
        Stats::default()
    });

    if cli.stats {
        print_stats(&stats);
        return Ok(());
    }

    if !settings.offers_format(cli.format) {
        tracing::warn!("Format {} is not enabled in context_menu_formats", cli.format);
    }

    let content = read_input(cli.file.as_ref()).await?;
    if !settings.meets_selection_threshold(&content) {
        tracing::info!(
            "Input is shorter than the selection threshold ({} chars)",
            settings.selection_threshold
        );
    }

    let state = Arc::new(StateManager::with_state(AppState::new(settings, stats)));
    let metrics = Arc::new(Metrics::new());

    let orchestrator = SaveOrchestrator::new(
        state,
        Arc::clone(&metrics),
        FilesystemDownloadSink::new(cli.out),
        LogNotificationSink,
        config_manager,
    );

    let result = orchestrator
        .save_selection(&StaticSelection(content), cli.format)
        .await;
    metrics.log_summary();

    let outcome = result?;
    println!("{}", outcome.saved_path);
    Ok(())
}

async fn read_input(file: Option<&Utf8PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path)),
        None => {
            let mut content = String::new();
            tokio::io::stdin()
                .read_to_string(&mut content)
                .await
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}

fn print_stats(stats: &Stats) {
    let today = stats.today_files_on(chrono::Utc::now());

    println!("Total files:  {}", stats.total_files);
    println!("Today:        {}", today);
    if !stats.last_file.is_empty() {
        println!("Last file:    {}", stats.last_file);
    }
    if !stats.format_usage.is_empty() {
        println!("Formats:");
        for (format, count) in &stats.format_usage {
            let label = format
                .parse::<FormatTag>()
                .map(|tag| tag.display_label())
                .unwrap_or(format.as_str());
            println!("  {:<22} {}", label, count);
        }
    }
    println!(
        "Detection:    {}/{} ({}%)",
        stats.detection_accuracy.correct,
        stats.detection_accuracy.total,
        stats.detection_accuracy.rate_percent()
    );

    println!();
    for rec in recommendations(stats) {
        println!("{} {}", rec.icon, rec.title);
        println!("   {}", rec.description);
    }
}
