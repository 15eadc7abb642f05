//! Configuration loading
//!
//! The file is read once; the parsed config and its content hash come from the
//! same bytes, so the logged hash always matches what was applied.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration from TOML text
///
/// An empty document is valid and yields the built-in defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads and validates the configuration file at `path`
///
/// # Returns
///
/// * `Ok(Config)` - Parsed configuration, defaults filled in
/// * `Err(ConfigError::Io)` - The file could not be read
/// * `Err(ConfigError::Parse)` / `Err(ConfigError::Validation)` - Bad contents
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex-encoded SHA-256 of configuration bytes
pub fn config_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Hashes the configuration file at `path` without parsing it
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(config_hash(&std::fs::read(path)?))
}

/// Loads the configuration at `path` together with the hash of its contents
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(content.as_bytes())))
}
