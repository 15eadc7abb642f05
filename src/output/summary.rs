//! Crawl run summary
//!
//! Collects what a city crawl wrote and what went wrong, so a failing store or
//! category is reported at the end instead of aborting the run.

use chrono::NaiveDate;
use std::path::PathBuf;

/// A store or category that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    pub store_id: i64,
    pub store_name: String,
    /// `None` when the store's categories could not be resolved
    pub category_slug: Option<String>,
    pub message: String,
}

/// Outcome of crawling one city
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub city: String,
    pub date: NaiveDate,
    /// Stores attempted
    pub stores: usize,
    /// Report artifacts written
    pub reports: Vec<PathBuf>,
    /// Paths written more than once in this crawl; the later report replaced the earlier
    pub overwritten: Vec<PathBuf>,
    /// Records written across all reports
    pub records: usize,
    /// Products skipped because their payload was malformed
    pub skipped_products: usize,
    pub failures: Vec<CrawlFailure>,
    /// Set when the crawl stopped early on cancellation
    pub cancelled: bool,
}

impl CrawlSummary {
    pub fn new(city: &str, date: NaiveDate) -> Self {
        Self {
            city: city.to_string(),
            date,
            stores: 0,
            reports: Vec::new(),
            overwritten: Vec::new(),
            records: 0,
            skipped_products: 0,
            failures: Vec::new(),
            cancelled: false,
        }
    }

    /// True when every store and category was processed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Prints a crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary: {} ===\n", summary.city);

    println!("Overview:");
    println!("  Date: {}", summary.date.format("%d-%m-%y"));
    println!("  Stores: {}", summary.stores);
    println!("  Reports written: {}", summary.reports.len());
    println!("  Records written: {}", summary.records);
    println!("  Malformed products skipped: {}", summary.skipped_products);
    if summary.cancelled {
        println!("  Crawl was cancelled before completion");
    }
    println!();

    if !summary.overwritten.is_empty() {
        println!("Overwritten reports ({}):", summary.overwritten.len());
        for path in &summary.overwritten {
            println!("  - {}", path.display());
        }
        println!();
    }

    if !summary.failures.is_empty() {
        println!("Failures ({}):", summary.failures.len());
        for failure in &summary.failures {
            match &failure.category_slug {
                Some(slug) => println!(
                    "  - {} (id {}) / {}: {}",
                    failure.store_name, failure.store_id, slug, failure.message
                ),
                None => println!(
                    "  - {} (id {}): {}",
                    failure.store_name, failure.store_id, failure.message
                ),
            }
        }
        println!();
    }
}
