//! Reference annotation store
//!
//! Holds one `AnnotationRecord` per identifier, persisted as a JSON object keyed by
//! identifier. Loading is tolerant: a damaged entry is dropped (and refetched on the next
//! crawl) instead of discarding the whole file.

use crate::model::{canonical_rsid, AnnotationRecord};
use crate::storage::json::{read_json_value, write_json_atomic};
use crate::storage::{AnnotationSource, StorageError, StorageResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceStore {
    records: BTreeMap<String, AnnotationRecord>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store, starting empty when the file does not exist yet
    pub fn load(path: &Path) -> StorageResult<Self> {
        let Some(value) = read_json_value(path)? else {
            tracing::info!("No reference data at {}, starting empty", path.display());
            return Ok(Self::new());
        };

        let Value::Object(entries) = value else {
            return Err(StorageError::layout(path, "expected a JSON object"));
        };

        let mut store = Self::new();
        for (rsid, raw) in entries {
            match serde_json::from_value::<AnnotationRecord>(raw) {
                Ok(mut record) => {
                    record.rsid = canonical_rsid(&rsid);
                    store.insert(record);
                }
                Err(e) => tracing::warn!("Dropping unreadable reference entry {}: {}", rsid, e),
            }
        }

        tracing::info!(
            "Loaded {} reference records from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Writes the store atomically
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        write_json_atomic(path, &self.records)
    }

    /// Adds a record; an existing record for the same identifier is kept
    ///
    /// Returns whether the record was inserted.
    pub fn insert(&mut self, record: AnnotationRecord) -> bool {
        let rsid = canonical_rsid(&record.rsid);
        if self.records.contains_key(&rsid) {
            return false;
        }
        self.records.insert(rsid, record);
        true
    }

    pub fn get(&self, rsid: &str) -> Option<&AnnotationRecord> {
        self.records.get(&canonical_rsid(rsid))
    }

    pub fn contains(&self, rsid: &str) -> bool {
        self.records.contains_key(&canonical_rsid(rsid))
    }

    /// Snapshot of the identifiers currently held
    pub fn identifiers(&self) -> HashSet<String> {
        self.records.keys().cloned().collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AnnotationSource for ReferenceStore {
    fn annotation(&self, rsid: &str) -> Option<&AnnotationRecord> {
        self.records.get(rsid)
    }
}
