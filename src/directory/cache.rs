//! Store directory cache
//!
//! The cache is a JSON object mapping city name to `[{store_id, name}]`. It is
//! never refreshed automatically: delete the file (or pass `--refresh-stores`)
//! to force a new discovery.

use crate::directory::{Store, StoreDirectory};
use crate::{MetroError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CachedStore {
    store_id: i64,
    name: String,
}

/// Loads a store directory from the cache file at `path`
pub fn load_cache(path: &Path) -> Result<StoreDirectory> {
    let content = std::fs::read_to_string(path)?;
    let cached: IndexMap<String, Vec<CachedStore>> =
        serde_json::from_str(&content).map_err(|e| cache_error(path, e.to_string()))?;

    let mut directory = StoreDirectory::new();
    for (city, stores) in cached {
        for cached_store in stores {
            directory.insert(Store {
                store_id: cached_store.store_id,
                name: cached_store.name,
                city: city.clone(),
            });
        }
    }

    Ok(directory)
}

/// Writes the directory to `path` atomically
///
/// The JSON goes to a sibling `.tmp` file which is then renamed over `path`,
/// so a reader never observes a partially written cache.
pub fn save_cache(path: &Path, directory: &StoreDirectory) -> Result<()> {
    let cached: IndexMap<&str, Vec<CachedStore>> = directory
        .iter()
        .map(|(city, stores)| {
            let entries = stores
                .iter()
                .map(|store| CachedStore {
                    store_id: store.store_id,
                    name: store.name.clone(),
                })
                .collect();
            (city, entries)
        })
        .collect();

    let payload =
        serde_json::to_vec_pretty(&cached).map_err(|e| cache_error(path, e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, &payload)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn cache_error(path: &Path, message: String) -> MetroError {
    MetroError::Cache {
        path: path.display().to_string(),
        message,
    }
}
