//! Metro-Prices: a store directory and price report crawler
//!
//! This crate discovers every live store of a retail chain through its public API,
//! walks each store's category tree and product catalog, and writes normalized
//! per-city/per-store/per-category price reports as JSON.

pub mod api;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod directory;
pub mod output;
pub mod report;

use thiserror::Error;

/// Main error type for Metro-Prices operations
#[derive(Debug, Error)]
pub enum MetroError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Rate limited by {url}")]
    RateLimited { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("API error: {0}")]
    Api(String),

    #[error("No stores in city '{city}', known cities: {known:?}")]
    CityNotFound { city: String, known: Vec<String> },

    #[error(
        "Store discovery incomplete: matched {matched} of {expected} stores \
         before reaching id ceiling {ceiling}"
    )]
    DiscoveryIncomplete {
        matched: u64,
        expected: u64,
        ceiling: u64,
    },

    #[error(
        "Pagination limit reached for store {store_id}, category '{slug}': \
         exceeded {max_pages} pages"
    )]
    PaginationLimit {
        store_id: i64,
        slug: String,
        max_pages: u32,
    },

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("Store cache error at {path}: {message}")]
    Cache { path: String, message: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetroError {
    /// Returns true for failures worth retrying: network errors, timeouts,
    /// HTTP 429 and HTTP 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Metro-Prices operations
pub type Result<T> = std::result::Result<T, MetroError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{CatalogApi, HttpCatalogApi};
pub use catalog::{CategoryResolver, ProductCatalogFetcher};
pub use config::Config;
pub use crawler::CrawlOrchestrator;
pub use directory::{Store, StoreDirectory, StoreDirectoryBuilder};
pub use output::{CrawlSummary, JsonReportWriter, ReportKey, ReportWriter};
pub use report::{build_records, ReportBatch, ReportRecord};
