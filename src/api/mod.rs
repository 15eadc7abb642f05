//! Remote API access
//!
//! This module contains everything that talks to the chain's servers:
//! - `CatalogApi`, the seam the crawl components are written against
//! - `HttpCatalogApi`, the reqwest-backed implementation
//! - Wire types for the REST and GraphQL payloads
//! - Retry with exponential backoff for transient failures

mod http;
mod retry;
pub mod types;

pub use http::{build_http_client, HttpCatalogApi};
pub use types::{Attribute, Category, Prices, RawProduct, Stock};

use crate::directory::Store;
use crate::Result;
use async_trait::async_trait;

/// Operations the crawl pipeline needs from the remote API
///
/// One call is one logical request; implementations may retry internally.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Total number of live stores reported by the chain
    async fn store_count(&self) -> Result<u64>;

    /// Store details for a probed identifier, `None` when the id is unused
    async fn store_detail(&self, id: u64) -> Result<Option<Store>>;

    /// Category tree of a store, in upstream order
    async fn category_tree(&self, store_id: i64) -> Result<Vec<Category>>;

    /// One page of a category's products starting at offset `from`
    async fn products_page(
        &self,
        store_id: i64,
        slug: &str,
        from: u32,
        size: u32,
    ) -> Result<Vec<RawProduct>>;
}
