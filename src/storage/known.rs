//! Catalogue of identifiers SNPedia has a page for
//!
//! Persisted as a sorted JSON array of lowercase identifiers. The crawler consults it
//! so that personal identifiers without a page are never requested.

use crate::model::canonical_rsid;
use crate::storage::json::{read_json_value, write_json_atomic};
use crate::storage::{StorageError, StorageResult};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownSnps {
    ids: HashSet<String>,
}

impl KnownSnps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a cached catalogue, or `None` when it has not been fetched yet
    ///
    /// Entries that are not strings are skipped.
    pub fn load(path: &Path) -> StorageResult<Option<Self>> {
        let Some(value) = read_json_value(path)? else {
            return Ok(None);
        };

        let Value::Array(entries) = value else {
            return Err(StorageError::layout(path, "expected a JSON array"));
        };

        let known: Self = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(rsid) => Some(rsid),
                other => {
                    tracing::warn!("Skipping catalogue entry {}", other);
                    None
                }
            })
            .collect();

        tracing::info!(
            "Loaded {} catalogue identifiers from {}",
            known.len(),
            path.display()
        );
        Ok(Some(known))
    }

    /// Writes the catalogue atomically, sorted for stable diffs
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let mut ids: Vec<&String> = self.ids.iter().collect();
        ids.sort();
        write_json_atomic(path, &ids)
    }

    /// Adds an identifier, returning whether it was new
    pub fn insert(&mut self, rsid: &str) -> bool {
        let rsid = canonical_rsid(rsid);
        !rsid.is_empty() && self.ids.insert(rsid)
    }

    pub fn contains(&self, rsid: &str) -> bool {
        self.ids.contains(&canonical_rsid(rsid))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KnownSnps {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut known = Self::new();
        for rsid in iter {
            known.insert(rsid.as_ref());
        }
        known
    }
}
