use crate::api::{CatalogApi, RawProduct};
use crate::{MetroError, Result};
use std::sync::Arc;

/// Fetches the full product list of a store category, page by page
pub struct ProductCatalogFetcher {
    api: Arc<dyn CatalogApi>,
    page_size: u32,
    max_pages: u32,
}

impl ProductCatalogFetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `api` - The remote API
    /// * `page_size` - Products requested per page, at least 1
    /// * `max_pages` - Pages fetched before giving up with `PaginationLimit`
    pub fn new(api: Arc<dyn CatalogApi>, page_size: u32, max_pages: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            max_pages,
        }
    }

    /// Returns every product of the category in upstream order
    ///
    /// Pages are requested from offset 0 and the walk ends on the first page
    /// shorter than the page size.
    pub async fn fetch_products(&self, store_id: i64, slug: &str) -> Result<Vec<RawProduct>> {
        let mut products = Vec::new();
        let mut from = 0u32;

        for page in 0..self.max_pages {
            let batch = self
                .api
                .products_page(store_id, slug, from, self.page_size)
                .await?;
            let returned = batch.len();
            products.extend(batch);

            tracing::trace!(
                "Store {} category '{}': page {} returned {} products",
                store_id,
                slug,
                page,
                returned
            );

            if returned < self.page_size as usize {
                tracing::debug!(
                    "Store {} category '{}': {} products",
                    store_id,
                    slug,
                    products.len()
                );
                return Ok(products);
            }

            from = from.saturating_add(u32::try_from(returned).unwrap_or(u32::MAX));
        }

        Err(MetroError::PaginationLimit {
            store_id,
            slug: slug.to_string(),
            max_pages: self.max_pages,
        })
    }
}
