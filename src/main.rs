//! Metro-Prices main entry point
//!
//! This is the command-line interface for the Metro-Prices crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use metro_prices::config::{load_config_with_hash, Config};
use metro_prices::crawler::{build_api, load_directory, run_crawl};
use metro_prices::output::print_summary;
use metro_prices::MetroError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Metro-Prices: store directory and price report crawler
///
/// Discovers every store of the chain, then writes per-store, per-category
/// price reports for a chosen city.
#[derive(Parser, Debug)]
#[command(name = "metro-prices")]
#[command(version = "1.0.0")]
#[command(about = "Store directory and price report crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Rediscover stores even if a store cache exists
    #[arg(long, global = true)]
    refresh_stores: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every store of a city and write price reports
    ParseData {
        /// City name as listed by `info`
        city: String,
    },

    /// Show the list of cities with stores
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        Command::ParseData { city } => {
            handle_parse_data(&config, &city, cli.refresh_stores, cancel).await
        }
        Command::Info => handle_info(&config, cli.refresh_stores, cancel).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("metro_prices=info,warn"),
            1 => EnvFilter::new("metro_prices=debug,info"),
            2 => EnvFilter::new("metro_prices=trace,debug"),
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

/// Cancels `token` on the first Ctrl-C
fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            token.cancel();
        }
    });
}

/// Handles `parse-data`: crawls one city
async fn handle_parse_data(
    config: &Config,
    city: &str,
    refresh_stores: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    match run_crawl(config, city, refresh_stores, cancel).await {
        Ok(summary) => {
            print_summary(&summary);
            if summary.cancelled {
                anyhow::bail!("crawl interrupted, reports above are partial");
            }
            if !summary.failures.is_empty() {
                anyhow::bail!(
                    "{} store(s)/category(ies) failed, see summary above",
                    summary.failures.len()
                );
            }
            Ok(())
        }
        Err(MetroError::CityNotFound { city, known }) => {
            println!("Error: no stores in '{}', available cities:", city);
            for name in &known {
                println!("  - {}", name);
            }
            Err(MetroError::CityNotFound { city, known }.into())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `info`: lists the cities of the store directory
async fn handle_info(
    config: &Config,
    refresh_stores: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let api = build_api(config)?;

    let directory = load_directory(config, api, refresh_stores, cancel).await?;

    println!("Available cities:");
    for (city, stores) in directory.iter() {
        println!("  - {} ({} stores)", city, stores.len());
    }

    Ok(())
}
