//! Configuration module for Metro-Prices
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; omitted keys fall back to the chain's public endpoints.
//!
//! # Example
//!
//! ```no_run
//! use metro_prices::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("metro.toml")).unwrap();
//! println!("Catalog page size: {}", config.catalog.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, CatalogConfig, Config, DiscoveryConfig, HttpConfig, OutputConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, config_hash, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
