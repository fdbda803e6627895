//! Enriched dataset file

use crate::model::EnrichedRecord;
use crate::storage::json::{read_json_value, write_json_atomic};
use crate::storage::{StorageError, StorageResult};
use serde_json::Value;
use std::path::Path;

/// Loads an enriched dataset, returning `None` when the file does not exist
///
/// Rows that fail to deserialize are skipped with a warning.
pub fn load_results(path: &Path) -> StorageResult<Option<Vec<EnrichedRecord>>> {
    let Some(value) = read_json_value(path)? else {
        return Ok(None);
    };

    let Value::Array(rows) = value else {
        return Err(StorageError::layout(path, "expected a JSON array"));
    };

    let total = rows.len();
    let records: Vec<EnrichedRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping dataset row {}: {}", index, e);
                None
            }
        })
        .collect();

    tracing::debug!(
        "Loaded {}/{} dataset rows from {}",
        records.len(),
        total,
        path.display()
    );
    Ok(Some(records))
}

/// Replaces the dataset file with `records`
pub fn save_results(path: &Path, records: &[EnrichedRecord]) -> StorageResult<()> {
    write_json_atomic(path, records)
}
