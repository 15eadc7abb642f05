//! Crawler module for city price crawls
//!
//! This module contains the crawl orchestration and the startup wiring:
//! - Building the HTTP API client from configuration
//! - Discovering or loading the store directory
//! - Running a city crawl into JSON reports

mod coordinator;

pub use coordinator::CrawlOrchestrator;

use crate::api::{CatalogApi, HttpCatalogApi};
use crate::config::Config;
use crate::directory::{StoreDirectory, StoreDirectoryBuilder};
use crate::output::{CrawlSummary, JsonReportWriter};
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds the HTTP-backed catalog API from configuration
pub fn build_api(config: &Config) -> Result<Arc<dyn CatalogApi>> {
    let api = HttpCatalogApi::new(config.api.clone(), &config.http)?;
    Ok(Arc::new(api))
}

/// Loads the store directory from cache, discovering it if needed
///
/// # Arguments
///
/// * `config` - Supplies the cache path and id ceiling
/// * `api` - The remote API
/// * `refresh` - Ignore an existing cache and rediscover
/// * `cancel` - Aborts discovery when cancelled
pub async fn load_directory(
    config: &Config,
    api: Arc<dyn CatalogApi>,
    refresh: bool,
    cancel: CancellationToken,
) -> Result<StoreDirectory> {
    let builder = StoreDirectoryBuilder::new(
        api,
        &config.output.store_cache_path,
        config.discovery.max_store_id,
    )
    .with_cancellation(cancel);

    if refresh {
        tracing::info!("Rediscovering stores, ignoring any existing cache");
        builder.rebuild().await
    } else {
        builder.discover().await
    }
}

/// Runs a complete city crawl
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP API client
/// 2. Load or discover the store directory
/// 3. Crawl every store of `city` into JSON reports under the report directory
///
/// # Example
///
/// ```no_run
/// use metro_prices::config::Config;
/// use metro_prices::crawler::run_crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let cancel = CancellationToken::new();
/// let summary = run_crawl(&Config::default(), "Москва", false, cancel).await?;
/// println!("{} reports written", summary.reports.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    city: &str,
    refresh_stores: bool,
    cancel: CancellationToken,
) -> Result<CrawlSummary> {
    let api = build_api(config)?;
    let directory = load_directory(config, api.clone(), refresh_stores, cancel.clone()).await?;
    let writer = Arc::new(JsonReportWriter::new(&config.output.report_dir));

    let orchestrator =
        CrawlOrchestrator::new(directory, api, writer, config).with_cancellation(cancel);
    orchestrator.crawl(city).await
}
