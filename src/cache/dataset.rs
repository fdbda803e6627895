//! Cache of enriched dataset files
//!
//! Serves the dataset files in the data directory through a `DataCache`, loading a file
//! from disk on a miss. Missing files are not cached, so a dataset written later is
//! picked up by the next read.

use crate::cache::pagination::{paginate, Page};
use crate::cache::store::{CacheStats, DataCache};
use crate::config::{CacheConfig, Config};
use crate::model::EnrichedRecord;
use crate::storage::load_results;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared, immutable view of a loaded dataset
pub type Dataset = Arc<Vec<EnrichedRecord>>;

pub struct DatasetCache {
    cache: DataCache<Dataset>,
    directory: PathBuf,
}

impl DatasetCache {
    pub fn new(directory: impl Into<PathBuf>, config: &CacheConfig) -> Self {
        Self {
            cache: DataCache::new(config.max_entries, config.ttl()),
            directory: directory.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data.directory, &config.cache)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn cache_key(file_name: &str) -> String {
        format!("json:{}", file_name)
    }

    /// The whole dataset in `file_name`, or `None` if the file does not exist
    ///
    /// File names containing path components are refused.
    pub fn get_all(&self, file_name: &str) -> crate::Result<Option<Dataset>> {
        if !is_plain_file_name(file_name) {
            tracing::warn!("Refusing dataset name with path components: {}", file_name);
            return Ok(None);
        }

        let key = Self::cache_key(file_name);
        if let Some(dataset) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", file_name);
            return Ok(Some(dataset));
        }

        let path = self.directory.join(file_name);
        let Some(records) = load_results(&path)? else {
            tracing::warn!("Dataset not found: {}", path.display());
            return Ok(None);
        };

        let dataset: Dataset = Arc::new(records);
        self.cache.set(&key, dataset.clone(), None);
        tracing::debug!("Loaded {} ({} records)", path.display(), dataset.len());
        Ok(Some(dataset))
    }

    /// One page of the dataset; a missing dataset yields an empty page
    pub fn get_page(
        &self,
        file_name: &str,
        page: usize,
        page_size: usize,
    ) -> crate::Result<Page<EnrichedRecord>> {
        Ok(match self.get_all(file_name)? {
            Some(dataset) => paginate(&dataset, page, page_size),
            None => Page::empty(page_size),
        })
    }

    /// Drops the cached copy of one dataset, e.g. after it was rewritten
    pub fn invalidate(&self, file_name: &str) {
        self.cache.invalidate(&Self::cache_key(file_name));
        tracing::info!("Invalidated cache for {}", file_name);
    }

    pub fn clear_all(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
