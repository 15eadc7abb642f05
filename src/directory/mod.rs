//! Store directory
//!
//! This module owns the city → stores mapping:
//! - `Store` and `StoreDirectory` types
//! - Discovery by probing the sequential store id space
//! - The JSON cache that makes discovery a one-time cost

mod builder;
mod cache;

pub use builder::StoreDirectoryBuilder;
pub use cache::{load_cache, save_cache};

use indexmap::IndexMap;

/// A single physical store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub store_id: i64,
    pub name: String,
    pub city: String,
}

/// Mapping from city to its stores, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreDirectory {
    cities: IndexMap<String, Vec<Store>>,
}

impl StoreDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a store to its city's bucket, creating the bucket on first sight
    pub fn insert(&mut self, store: Store) {
        self.cities
            .entry(store.city.clone())
            .or_default()
            .push(store);
    }

    /// Stores of a city, or `None` if the city is unknown
    pub fn stores_in(&self, city: &str) -> Option<&[Store]> {
        self.cities.get(city).map(Vec::as_slice)
    }

    pub fn contains_city(&self, city: &str) -> bool {
        self.cities.contains_key(city)
    }

    /// City names in directory order
    pub fn cities(&self) -> Vec<String> {
        self.cities.keys().cloned().collect()
    }

    /// Iterates over `(city, stores)` pairs in directory order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Store])> {
        self.cities
            .iter()
            .map(|(city, stores)| (city.as_str(), stores.as_slice()))
    }

    /// Total number of stores across all cities
    pub fn store_count(&self) -> usize {
        self.cities.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
