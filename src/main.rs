//! yc-harvest main entry point
//!
//! This is the command-line interface for the yc-harvest company page scraper.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use yc_harvest::checkpoint::checkpoint_path_for;
use yc_harvest::config::{load_config_with_hash, validate, Config};
use yc_harvest::output::{export_checkpoint, print_statistics, write_output};
use yc_harvest::pipeline::{run_scrape, RunOptions};

/// yc-harvest: scrape company profile pages into a CSV or workbook
///
/// Reads company page links from a CSV, fetches each page with a bounded,
/// rate-limited worker pool, extracts the company fields and writes one row
/// per link. Progress is checkpointed next to the output so an interrupted run
/// can be resumed.
#[derive(Parser, Debug)]
#[command(name = "yc-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Scrape YC company pages into CSV", long_about = None)]
struct Cli {
    /// CSV file containing the link column
    #[arg(long, value_name = "CSV", required_unless_present = "export_checkpoint")]
    input: Option<PathBuf>,

    /// Output path; a `.xlsx` extension writes a workbook, anything else CSV
    #[arg(long, value_name = "FILE")]
    output: PathBuf,

    /// Number of concurrent workers [config default: 8]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Max requests per minute, sets the base delay [config default: 120]
    #[arg(long)]
    rpm: Option<u32>,

    /// Retries per target after the first attempt [config default: 4]
    #[arg(long)]
    max_retries: Option<u32>,

    /// Resume from the checkpoint next to the output, if present
    #[arg(long)]
    resume: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Convert an existing checkpoint to the output file and exit
    #[arg(long, value_name = "CKPT", conflicts_with_all = ["input", "resume"])]
    export_checkpoint: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(checkpoint) = &cli.export_checkpoint {
        return handle_export(checkpoint, &cli.output);
    }

    let config = load_effective_config(&cli)?;
    let input = cli
        .input
        .clone()
        .context("--input is required when scraping")?;

    handle_scrape(config, input, &cli.output, cli.resume).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("yc_harvest=info,warn"),
            1 => EnvFilter::new("yc_harvest=debug,info"),
            2 => EnvFilter::new("yc_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.scraper.concurrency = concurrency;
    }
    if let Some(rpm) = cli.rpm {
        config.scraper.requests_per_minute = rpm;
    }
    if let Some(max_retries) = cli.max_retries {
        config.scraper.max_retries = max_retries;
    }

    validate(&config).context("Invalid settings")?;
    Ok(config)
}

/// Handles the --export-checkpoint mode: writes a checkpoint's rows to the output file
fn handle_export(checkpoint: &Path, output: &Path) -> anyhow::Result<()> {
    let rows = export_checkpoint(checkpoint, output)
        .with_context(|| format!("Failed to export checkpoint {}", checkpoint.display()))?;
    println!("Wrote {} rows to {}", rows, output.display());
    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: Config,
    input: PathBuf,
    output: &Path,
    resume: bool,
) -> anyhow::Result<()> {
    let options = RunOptions {
        input,
        checkpoint: checkpoint_path_for(output),
        resume,
    };

    if resume {
        tracing::info!(
            "Starting scrape (resuming from {})",
            options.checkpoint.display()
        );
    } else {
        tracing::info!("Starting scrape");
    }

    let outcome = run_scrape(config, &options).await.map_err(|e| {
        tracing::error!("Scrape failed: {}", e);
        e
    })?;

    write_output(output, &outcome.records)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("Scrape completed successfully");
    print_statistics(&outcome.stats);
    Ok(())
}
