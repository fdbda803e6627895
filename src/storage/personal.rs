//! Personal genotype store
//!
//! A JSON object mapping identifiers to `(X;Y)` genotype strings.

use crate::model::{canonical_rsid, Genotype, GenotypeCall};
use crate::storage::json::{read_json_value, write_json_atomic};
use crate::storage::{GenotypeSource, StorageError, StorageResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// The individual's genotype calls keyed by canonical identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalStore {
    calls: BTreeMap<String, Genotype>,
}

impl PersonalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store from disk
    ///
    /// A missing or unreadable file is an error; without personal data nothing can be
    /// crawled or enriched. Individual entries with malformed genotypes are skipped.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let value = read_json_value(path)?.ok_or_else(|| {
            StorageError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "personal data file not found"),
            )
        })?;

        let Value::Object(entries) = value else {
            return Err(StorageError::layout(path, "expected a JSON object"));
        };

        let mut store = Self::new();
        let mut skipped = 0usize;
        for (rsid, raw) in entries {
            let parsed = raw
                .as_str()
                .ok_or_else(|| "genotype is not a string".to_string())
                .and_then(|text| text.parse::<Genotype>().map_err(|e| e.to_string()));

            match parsed {
                Ok(genotype) => store.insert(GenotypeCall::new(&rsid, genotype)),
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!("Skipping personal entry {}: {}", rsid, reason);
                }
            }
        }

        tracing::info!(
            "Loaded {} personal genotypes from {} ({} skipped)",
            store.len(),
            path.display(),
            skipped
        );
        Ok(store)
    }

    /// Writes the store atomically
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let serialized: BTreeMap<&str, String> = self
            .calls
            .iter()
            .map(|(rsid, genotype)| (rsid.as_str(), genotype.to_string()))
            .collect();
        write_json_atomic(path, &serialized)
    }

    /// Adds or replaces a call
    pub fn insert(&mut self, call: GenotypeCall) {
        self.calls.insert(call.rsid, call.genotype);
    }

    pub fn get(&self, rsid: &str) -> Option<Genotype> {
        self.calls.get(&canonical_rsid(rsid)).copied()
    }

    /// Identifiers in canonical form, sorted
    pub fn identifiers(&self) -> Vec<String> {
        self.calls.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl GenotypeSource for PersonalStore {
    fn calls(&self) -> Box<dyn Iterator<Item = GenotypeCall> + '_> {
        Box::new(self.calls.iter().map(|(rsid, genotype)| GenotypeCall {
            rsid: rsid.clone(),
            genotype: *genotype,
        }))
    }

    fn call_count(&self) -> usize {
        self.len()
    }
}

impl FromIterator<GenotypeCall> for PersonalStore {
    fn from_iter<I: IntoIterator<Item = GenotypeCall>>(iter: I) -> Self {
        let mut store = Self::new();
        for call in iter {
            store.insert(call);
        }
        store
    }
}
