//! Crawl orchestration
//!
//! Drives one city crawl: validates the city against the store directory, then
//! for every store resolves categories, pages through each category's products,
//! derives report records and hands them to the report writer.
//!
//! A failing store or category is recorded in the summary and the crawl moves on
//! to the next one.

use crate::api::CatalogApi;
use crate::catalog::{CategoryResolver, ProductCatalogFetcher};
use crate::config::Config;
use crate::directory::{Store, StoreDirectory};
use crate::output::{CrawlFailure, CrawlSummary, ReportKey, ReportWriter};
use crate::report::build_records;
use crate::{MetroError, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main crawl orchestrator
pub struct CrawlOrchestrator {
    directory: StoreDirectory,
    resolver: CategoryResolver,
    fetcher: ProductCatalogFetcher,
    writer: Arc<dyn ReportWriter>,
    city_domain: String,
    report_date: Option<NaiveDate>,
    cancel: CancellationToken,
}

/// What one category contributed to the run
struct CategoryOutcome {
    path: PathBuf,
    records: usize,
    skipped: usize,
}

impl CrawlOrchestrator {
    /// Creates an orchestrator over an already discovered store directory
    ///
    /// # Arguments
    ///
    /// * `directory` - The store directory to crawl from
    /// * `api` - The remote API
    /// * `writer` - Where reports are delivered
    /// * `config` - Supplies the site domain and catalog paging
    pub fn new(
        directory: StoreDirectory,
        api: Arc<dyn CatalogApi>,
        writer: Arc<dyn ReportWriter>,
        config: &Config,
    ) -> Self {
        Self {
            directory,
            resolver: CategoryResolver::new(api.clone()),
            fetcher: ProductCatalogFetcher::new(
                api,
                config.catalog.page_size,
                config.catalog.max_pages,
            ),
            writer,
            city_domain: config.api.site_domain.clone(),
            report_date: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Stamps reports with a fixed date instead of today's local date
    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }

    /// Stops the crawl between categories once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn directory(&self) -> &StoreDirectory {
        &self.directory
    }

    /// Crawls every store of `city`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The crawl ran; per-store and per-category failures
    ///   are listed in the summary
    /// * `Err(MetroError::CityNotFound)` - `city` has no stores; nothing written
    pub async fn crawl(&self, city: &str) -> Result<CrawlSummary> {
        let stores = self
            .directory
            .stores_in(city)
            .ok_or_else(|| MetroError::CityNotFound {
                city: city.to_string(),
                known: self.directory.cities(),
            })?;

        let date = self
            .report_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let mut summary = CrawlSummary::new(city, date);

        tracing::info!("Crawling {} stores in {}", stores.len(), city);

        for store in stores {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            summary.stores += 1;
            self.crawl_store(store, date, &mut summary).await;
        }

        if summary.cancelled {
            tracing::warn!(
                "Crawl of {} cancelled after {} reports",
                city,
                summary.reports.len()
            );
        } else {
            tracing::info!(
                "Crawl of {} finished: {} reports, {} records, {} failures",
                city,
                summary.reports.len(),
                summary.records,
                summary.failures.len()
            );
        }

        Ok(summary)
    }

    async fn crawl_store(&self, store: &Store, date: NaiveDate, summary: &mut CrawlSummary) {
        tracing::info!("Processing store: {} (id {})", store.name, store.store_id);

        let slugs = match self.resolver.resolve_categories(store.store_id).await {
            Ok(slugs) => slugs,
            Err(e) => {
                tracing::error!(
                    "Failed to resolve categories of store {}: {}",
                    store.store_id,
                    e
                );
                summary.failures.push(CrawlFailure {
                    store_id: store.store_id,
                    store_name: store.name.clone(),
                    category_slug: None,
                    message: e.to_string(),
                });
                return;
            }
        };

        for slug in slugs {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                return;
            }

            tracing::info!("Downloading category: {}", slug);
            match self.crawl_category(store, &slug, date).await {
                Ok(outcome) => {
                    if summary.reports.contains(&outcome.path) {
                        tracing::warn!(
                            "Report {} was already written in this crawl, \
                             overwritten by store {} (id {}) category '{}'",
                            outcome.path.display(),
                            store.name,
                            store.store_id,
                            slug
                        );
                        summary.overwritten.push(outcome.path.clone());
                    }
                    summary.records += outcome.records;
                    summary.skipped_products += outcome.skipped;
                    summary.reports.push(outcome.path);
                }
                Err(MetroError::Cancelled) => {
                    summary.cancelled = true;
                    return;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to process store {} category '{}': {}",
                        store.store_id,
                        slug,
                        e
                    );
                    summary.failures.push(CrawlFailure {
                        store_id: store.store_id,
                        store_name: store.name.clone(),
                        category_slug: Some(slug),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    async fn crawl_category(
        &self,
        store: &Store,
        slug: &str,
        date: NaiveDate,
    ) -> Result<CategoryOutcome> {
        let products = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(MetroError::Cancelled);
            }
            fetched = self.fetcher.fetch_products(store.store_id, slug) => fetched?,
        };

        let batch = build_records(&products, &self.city_domain);
        let key = ReportKey {
            city: store.city.clone(),
            date,
            store_name: store.name.clone(),
            category_slug: slug.to_string(),
        };
        let path = self.writer.write_report(&key, &batch.records)?;

        Ok(CategoryOutcome {
            path,
            records: batch.records.len(),
            skipped: batch.skipped.len(),
        })
    }
}
