//! pdf-digest command line
//!
//! Run with: cargo run -p pdf-digest -- <folder>

use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_digest::config::StoreBackend;
use pdf_digest::processing::{FileOutcome, RunReport};
use pdf_digest::{PipelineConfig, PipelineOrchestrator};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "pdf-digest",
    version,
    about = "Summarize every PDF in a folder and store summaries and keywords"
)]
struct Cli {
    /// Folder to scan (overrides input.folder)
    folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "PDF_DIGEST_CONFIG")]
    config: Option<PathBuf>,

    /// File name suffix to match, case-sensitive
    #[arg(long)]
    extension: Option<String>,

    /// Walk sub-folders too
    #[arg(short, long)]
    recursive: bool,

    /// Files processed concurrently
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Sentences per summary
    #[arg(long)]
    summary_sentences: Option<usize>,

    /// Keywords per document
    #[arg(long)]
    keywords: Option<usize>,

    /// Word ignored by the summarizer and keyword extractor (repeatable)
    #[arg(long = "stop-word")]
    stop_words: Vec<String>,

    /// Document store backend
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// SQLite database file
    #[arg(long, env = "PDF_DIGEST_DB")]
    db: Option<PathBuf>,

    /// Give up on extracting a single file after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Sqlite,
    Memory,
}

impl From<BackendArg> for StoreBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Sqlite => StoreBackend::Sqlite,
            BackendArg::Memory => StoreBackend::Memory,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = load_config(&cli)?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Input folder: {}", config.input.folder.display());
    tracing::info!("  - Extension: {}", config.input.extension);
    tracing::info!("  - Summary sentences: {}", config.analysis.summary_sentences);
    tracing::info!("  - Keywords: {}", config.analysis.num_keywords);

    let orchestrator =
        PipelineOrchestrator::from_config(config).context("invalid configuration")?;

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, letting in-flight writes finish");
            token.cancel();
        }
    });

    let spinner = (!cli.json && console::Term::stderr().is_term()).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!(
            "Digesting {} with {} workers",
            orchestrator.config().input.folder.display(),
            orchestrator.parallel_files()
        ));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });

    let report = orchestrator.run().await.context("run aborted")?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    report.log_summary();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_digest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

/// Config file first, then command line overrides
fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(folder) = &cli.folder {
        config.input.folder = folder.clone();
    }
    if let Some(extension) = &cli.extension {
        config.input.extension = extension.clone();
    }
    if cli.recursive {
        config.input.recursive = true;
    }
    if let Some(workers) = cli.workers {
        config.processing.parallel_files = Some(workers);
    }
    if let Some(n) = cli.summary_sentences {
        config.analysis.summary_sentences = n;
    }
    if let Some(k) = cli.keywords {
        config.analysis.num_keywords = k;
    }
    config.analysis.stop_words.extend(cli.stop_words.iter().cloned());
    if let Some(backend) = cli.backend {
        config.store.backend = backend.into();
    }
    if let Some(db) = &cli.db {
        config.store.sqlite_path = db.clone();
    }
    if let Some(secs) = cli.timeout {
        config.processing.extract_timeout_secs = Some(secs);
    }

    Ok(config)
}

fn print_report(report: &RunReport) {
    for file in &report.files {
        let name = file.path.display();
        match &file.outcome {
            FileOutcome::Completed { document_id } => {
                println!("{} {} ({})", style("done").green(), name, document_id)
            }
            FileOutcome::Skipped { reason } => {
                println!("{} {}: {}", style("skip").yellow(), name, reason)
            }
            FileOutcome::Failed {
                stage,
                error,
                document_id,
            } => {
                let partial = document_id
                    .map(|id| format!(" [record {} not updated]", id))
                    .unwrap_or_default();
                println!(
                    "{} {} after {}: {}{}",
                    style("fail").red(),
                    name,
                    stage,
                    error,
                    partial
                )
            }
            FileOutcome::Crashed { error } => {
                println!("{} {}: {}", style("fail").red().bold(), name, error)
            }
            FileOutcome::Cancelled { stage } => {
                println!("{} {} at {}", style("stop").dim(), name, stage)
            }
        }
    }

    println!(
        "\n{} files: {} done, {} skipped, {} failed, {} cancelled in {:.2}s",
        report.total(),
        style(report.completed()).green(),
        style(report.skipped()).yellow(),
        style(report.failed()).red(),
        report.cancelled(),
        report.elapsed_ms as f64 / 1000.0
    );
}
