//! kpvotes main entry point
//!
//! This is the command-line interface for the Kinopoisk votes exporter.

use anyhow::Context;
use clap::Parser;
use kpvotes::config::{apply_env_overrides, load_config, validate, Config};
use kpvotes::domain::UserId;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// kpvotes: Kinopoisk votes exporter
///
/// Reads all movie votes of a Kinopoisk user, finds every movie on IMDb and
/// writes the votes as a CSV file in the IMDb ratings export format.
#[derive(Parser, Debug)]
#[command(name = "kpvotes")]
#[command(version)]
#[command(about = "Exports Kinopoisk votes to IMDb ratings CSV", long_about = None)]
struct Cli {
    /// Kinopoisk user ID
    #[arg(long, value_name = "UID")]
    uid: UserId,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Target CSV file path
    #[arg(short, long, value_name = "PATH")]
    target: Option<PathBuf>,

    /// IMDb lookup cache file path
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Maximum votes per CSV file (0 writes a single file)
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,

    /// HTTP proxy URL
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,

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

    let config = build_config(&cli)?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    tracing::info!(uid = %cli.uid, target_path = %config.output.target_path.display(), "Starting export");

    match kpvotes::run(&config, cli.uid, &cancel).await {
        Ok(summary) => {
            tracing::info!("Exported {} votes", summary.votes);
            for file in &summary.files {
                println!("{}", file.display());
            }
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            tracing::warn!("Export interrupted");
            Err(e.into())
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            Err(e).with_context(|| format!("failed to export votes of user {}", cli.uid))
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kpvotes=info,warn"),
            1 => EnvFilter::new("kpvotes=debug,info"),
            2 => EnvFilter::new("kpvotes=trace,debug"),
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

/// Builds the configuration from the file, the environment and the flags
///
/// Later sources win: file, then `KPEXPORT_PROXY_URL`, then command line.
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config);

    if let Some(target) = &cli.target {
        config.output.target_path = target.clone();
    }
    if let Some(cache) = &cli.cache {
        config.output.cache_path = Some(cache.clone());
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.output.chunk_size = chunk_size;
    }
    if let Some(proxy) = &cli.proxy {
        config.http.proxy_url = Some(proxy.clone());
    }

    validate(&config).context("invalid configuration")?;

    Ok(config)
}

/// Cancels the token on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, stopping");
                cancel.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for interrupt: {}", e),
        }
    });
}
