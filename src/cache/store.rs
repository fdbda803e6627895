//! Keyed in-memory cache with TTL expiry and hybrid LRU/LFU eviction

use crate::cache::pagination::{paginate, Page};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A cached value with its bookkeeping
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    /// Insertion order, breaks ties between entries inserted within one clock tick
    sequence: u64,
    ttl: Duration,
    access_count: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) > self.ttl
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// Percentage of requests that hit, 0 when there were none
    pub hit_rate: f64,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_sequence: u64,
    hits: u64,
    misses: u64,
}

/// Thread-safe cache with per-entry TTL
///
/// Reads update access counts, so every operation takes the lock. When a new key is
/// inserted at capacity, the entry with the fewest accesses is evicted, the oldest
/// insertion among equals going first.
#[derive(Debug)]
pub struct DataCache<V> {
    state: Mutex<CacheState<V>>,
    max_size: usize,
    default_ttl: Duration,
}

impl<V: Clone> DataCache<V> {
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                next_sequence: 0,
                hits: 0,
                misses: 0,
            }),
            max_size: max_size.max(1),
            default_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a clone of the value, or `None` when absent or expired
    ///
    /// An expired entry is removed by the read that finds it.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.lock();
        let now = Instant::now();

        let expired = match state.entries.get(key) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            state.entries.remove(key);
            state.misses += 1;
            tracing::debug!("Cache expired for key: {}", key);
            return None;
        }

        state.hits += 1;
        let entry = state.entries.get_mut(key)?;
        entry.access_count += 1;
        Some(entry.value.clone())
    }

    /// Stores `value` under `key`, with the default TTL when `ttl` is `None`
    ///
    /// Replacing an existing key resets its access count and age.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let mut state = self.lock();

        if state.entries.len() >= self.max_size && !state.entries.contains_key(key) {
            evict_one(&mut state);
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                sequence,
                ttl: ttl.unwrap_or(self.default_ttl),
                access_count: 0,
            },
        );
        tracing::debug!("Cached data for key: {}", key);
    }

    /// Removes one entry; returns whether it was present
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.lock().entries.remove(key).is_some();
        if removed {
            tracing::debug!("Invalidated cache for key: {}", key);
        }
        removed
    }

    /// Removes every entry and resets the hit/miss counters
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
        tracing::info!("Cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let total_requests = state.hits + state.misses;
        let hit_rate = if total_requests > 0 {
            state.hits as f64 * 100.0 / total_requests as f64
        } else {
            0.0
        };

        CacheStats {
            size: state.entries.len(),
            max_size: self.max_size,
            hits: state.hits,
            misses: state.misses,
            total_requests,
            hit_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> DataCache<Arc<Vec<T>>> {
    /// Page of the cached list under `key`, or `None` on a miss
    pub fn paginate(&self, key: &str, page: usize, page_size: usize) -> Option<Page<T>> {
        let items = self.get(key)?;
        Some(paginate(&items, page, page_size))
    }
}

fn evict_one<V>(state: &mut CacheState<V>) {
    let victim = state
        .entries
        .iter()
        .min_by_key(|(_, entry)| (entry.access_count, entry.inserted_at, entry.sequence))
        .map(|(key, _)| key.clone());

    if let Some(key) = victim {
        state.entries.remove(&key);
        tracing::debug!("Evicted cache entry: {}", key);
    }
}
