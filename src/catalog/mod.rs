//! Per-store catalog access
//!
//! - `CategoryResolver` turns a store's category tree into the slugs worth crawling
//! - `ProductCatalogFetcher` pages through a category's products

mod categories;
mod products;

pub use categories::{flatten_categories, CategoryResolver, PROMO_ROOT_TYPE};
pub use products::ProductCatalogFetcher;
