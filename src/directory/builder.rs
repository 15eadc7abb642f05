//! Store discovery
//!
//! The chain exposes no store listing, only a total count and a detail endpoint
//! keyed by sequential id. Discovery probes ids from 1 upward, skipping unused
//! ids, until as many stores as the reported total have been found.

use crate::api::CatalogApi;
use crate::directory::cache::{load_cache, save_cache};
use crate::directory::StoreDirectory;
use crate::{MetroError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds the store directory, from cache when one exists
pub struct StoreDirectoryBuilder {
    api: Arc<dyn CatalogApi>,
    cache_path: PathBuf,
    max_store_id: u64,
    cancel: CancellationToken,
}

impl StoreDirectoryBuilder {
    /// Creates a builder
    ///
    /// # Arguments
    ///
    /// * `api` - The remote API to probe
    /// * `cache_path` - Where the directory cache is read from and written to
    /// * `max_store_id` - Highest id probed before discovery fails
    pub fn new(
        api: Arc<dyn CatalogApi>,
        cache_path: impl Into<PathBuf>,
        max_store_id: u64,
    ) -> Self {
        Self {
            api,
            cache_path: cache_path.into(),
            max_store_id,
            cancel: CancellationToken::new(),
        }
    }

    /// Aborts discovery with `MetroError::Cancelled` once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Returns the store directory
    ///
    /// An existing cache is returned as-is, with no freshness check. Otherwise
    /// the directory is discovered over the network and persisted before being
    /// returned.
    pub async fn discover(&self) -> Result<StoreDirectory> {
        if self.cache_path.exists() {
            tracing::info!(
                "Loading store directory from cache {}",
                self.cache_path.display()
            );
            let directory = load_cache(&self.cache_path)?;
            tracing::info!(
                "Loaded {} stores in {} cities from cache",
                directory.store_count(),
                directory.cities().len()
            );
            return Ok(directory);
        }

        self.rebuild().await
    }

    /// Discovers the directory over the network and overwrites the cache
    pub async fn rebuild(&self) -> Result<StoreDirectory> {
        let directory = self.probe().await?;
        save_cache(&self.cache_path, &directory)?;
        tracing::info!(
            "Store directory saved to {}",
            self.cache_path.display()
        );
        Ok(directory)
    }

    async fn probe(&self) -> Result<StoreDirectory> {
        tracing::info!("Collecting store information...");
        let expected = self.api.store_count().await?;
        tracing::info!("Chain reports {} live stores", expected);

        let mut directory = StoreDirectory::new();
        let mut matched = 0u64;
        let mut next_id = 1u64;

        while matched < expected {
            if self.cancel.is_cancelled() {
                return Err(MetroError::Cancelled);
            }

            if next_id > self.max_store_id {
                return Err(MetroError::DiscoveryIncomplete {
                    matched,
                    expected,
                    ceiling: self.max_store_id,
                });
            }

            match self.api.store_detail(next_id).await? {
                Some(store) => {
                    matched += 1;
                    tracing::debug!(
                        "Store {}/{}: id {} '{}' in {}",
                        matched,
                        expected,
                        store.store_id,
                        store.name,
                        store.city
                    );
                    directory.insert(store);
                }
                None => tracing::trace!("Store id {} is unused", next_id),
            }

            next_id += 1;
        }

        tracing::info!(
            "Discovery finished: {} stores in {} cities, probed {} ids",
            matched,
            directory.cities().len(),
            next_id - 1
        );

        Ok(directory)
    }
}
