//! Caching of the enriched dataset
//!
//! This module provides:
//! - `DataCache`: a thread-safe keyed cache with TTL expiry and hybrid LRU/LFU eviction
//! - `paginate` / `Page`: page slicing with clamped page numbers
//! - `DatasetCache`: dataset files from the data directory served through a `DataCache`
//!
//! Caches are plain values passed to whoever needs them; there is no global instance.

mod dataset;
mod pagination;
mod store;

pub use dataset::{Dataset, DatasetCache};
pub use pagination::{paginate, Page};
pub use store::{CacheStats, DataCache};
