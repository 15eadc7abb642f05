//! Price report records
//!
//! Turns raw catalog products into normalized report records:
//! - absolute product URL on the city's site domain
//! - regular and promotional price derived from the representative stock
//! - brand from the brand attribute
//!
//! Products that lack the stock or brand shape are skipped and reported back
//! to the caller rather than failing the whole category.

use crate::api::RawProduct;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A product payload missing the fields a report record is derived from
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed product '{article}': {reason}")]
pub struct MalformedProduct {
    pub article: String,
    pub reason: String,
}

impl MalformedProduct {
    pub fn new(article: &str, reason: &str) -> Self {
        Self {
            article: article.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// One product line of a price report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub article: String,
    pub name: String,
    /// Absolute product URL
    pub url: String,
    pub regular_price: f64,
    /// Present only when the product is on promotion
    pub promo_price: Option<f64>,
    pub brand: String,
}

/// Result of converting one category's products
#[derive(Debug, Clone, Default)]
pub struct ReportBatch {
    pub records: Vec<ReportRecord>,
    pub skipped: Vec<MalformedProduct>,
}

/// Derives `(regular_price, promo_price)` from a price pair
///
/// A non-zero old price means the product is on promotion: the old price is
/// the regular one and the current price is the promo. Otherwise the current
/// price is the regular price and there is no promo.
pub fn derive_prices(price: f64, old_price: Option<f64>) -> (f64, Option<f64>) {
    match old_price {
        Some(old) if old != 0.0 => (old, Some(price)),
        _ => (price, None),
    }
}

/// Converts a single product
pub fn build_record(
    product: &RawProduct,
    city_domain: &str,
) -> Result<ReportRecord, MalformedProduct> {
    let prices = product.representative_prices()?;
    let price = prices.price.ok_or_else(|| {
        MalformedProduct::new(&product.article, "representative stock has no price")
    })?;
    let brand = product.brand()?;

    let (regular_price, promo_price) = derive_prices(price, prices.old_price);

    Ok(ReportRecord {
        article: product.article.clone(),
        name: product.name.clone(),
        url: format!("{}{}", city_domain, product.url),
        regular_price,
        promo_price,
        brand: brand.to_string(),
    })
}

/// Converts a category's products, skipping malformed ones
pub fn build_records(products: &[RawProduct], city_domain: &str) -> ReportBatch {
    let mut batch = ReportBatch::default();

    for product in products {
        match build_record(product, city_domain) {
            Ok(record) => batch.records.push(record),
            Err(malformed) => {
                tracing::warn!("Skipping product: {}", malformed);
                batch.skipped.push(malformed);
            }
        }
    }

    batch
}
