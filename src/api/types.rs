//! Wire types for the chain's REST and GraphQL endpoints
//!
//! ## Observed shapes
//!
//! ### Store count
//! `{ "Count": 93, ... }`; only `Count` is read.
//!
//! ### Store detail
//! Retired or unused ids answer `{ "success": false }` with no `data`, so `data`
//! is optional and only read when `success` is true.
//!
//! ### Products
//! `article` arrives as a string for most items and as a bare number for some
//! older ones. `old_price` is `null` or `0` when there is no promotion. `stocks`
//! and `attributes` are lists whose first entry carries the representative
//! prices and the brand respectively; see [`RawProduct::representative_prices`]
//! and [`RawProduct::brand`].

use crate::report::MalformedProduct;
use serde::{Deserialize, Deserializer};

/// Response from the store count endpoint
#[derive(Debug, Deserialize)]
pub struct StoreCountResponse {
    #[serde(rename = "Count")]
    pub count: u64,
}

/// Response from the store detail endpoint
#[derive(Debug, Deserialize)]
pub struct StoreDetailResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<StoreDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreDetail {
    pub store_id: i64,
    pub name: String,
    pub city: String,
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchCategories,
}

#[derive(Debug, Deserialize)]
pub struct SearchCategories {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// A catalog category as returned by the category tree query
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub slug: String,
    pub category_type: String,
    /// Present when the upstream nests subcategories
    #[serde(default)]
    pub children: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryData {
    /// `null` for a slug the store no longer carries
    #[serde(default)]
    pub category: Option<CategoryProducts>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryProducts {
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// A product as returned by the catalog query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "string_or_number")]
    pub article: String,
    #[serde(default)]
    pub name: String,
    /// Site-relative product URL, e.g. `/products/milk-1l`
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub stocks: Vec<Stock>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stock {
    #[serde(default)]
    pub prices: Prices,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prices {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub old_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub text: Option<String>,
}

impl RawProduct {
    /// Prices of the representative stock, which is the first stock entry
    pub fn representative_prices(&self) -> Result<&Prices, MalformedProduct> {
        self.stocks
            .first()
            .map(|stock| &stock.prices)
            .ok_or_else(|| MalformedProduct::new(&self.article, "product has no stock entries"))
    }

    /// Brand name, carried by the first attribute
    pub fn brand(&self) -> Result<&str, MalformedProduct> {
        let attribute = self
            .attributes
            .first()
            .ok_or_else(|| MalformedProduct::new(&self.article, "product has no attributes"))?;

        attribute
            .text
            .as_deref()
            .ok_or_else(|| MalformedProduct::new(&self.article, "brand attribute has no text"))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
