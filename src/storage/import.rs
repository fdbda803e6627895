//! Raw genotype export import
//!
//! Two tab-separated layouts are recognised per line:
//!
//! | Columns | Layout |
//! |---------|--------|
//! | 5+ | Ancestry: `rsid chromosome position allele1 allele2` (`0` is a no-call) |
//! | 4  | 23andMe: `rsid chromosome position genotype` (`AG`, `--`) |
//!
//! Comment lines (`#`) and the `rsid` header are skipped; malformed lines are skipped and
//! counted rather than failing the import.

use crate::model::{Genotype, GenotypeCall};
use crate::storage::{PersonalStore, StorageError, StorageResult};
use std::path::Path;

/// Counts gathered while importing a raw export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub no_calls: usize,
    pub skipped: usize,
}

/// Reads a raw export file into a personal store
pub fn import_raw(path: &Path) -> StorageResult<(PersonalStore, ImportSummary)> {
    let content = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let (store, summary) = parse_raw_export(&content);

    if store.is_empty() && summary.skipped > 0 {
        return Err(StorageError::layout(
            path,
            format!("no usable genotype lines ({} skipped)", summary.skipped),
        ));
    }

    tracing::info!(
        "Imported {} genotypes from {} ({} no-calls, {} lines skipped)",
        summary.imported,
        path.display(),
        summary.no_calls,
        summary.skipped
    );
    Ok((store, summary))
}

/// Parses the text of a raw export
pub fn parse_raw_export(content: &str) -> (PersonalStore, ImportSummary) {
    let mut store = PersonalStore::new();
    let mut summary = ImportSummary::default();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.to_lowercase().starts_with("rsid") {
            continue;
        }

        match parse_line(line) {
            Some(call) => {
                if !call.has_genotype() {
                    summary.no_calls += 1;
                }
                summary.imported += 1;
                store.insert(call);
            }
            None => {
                summary.skipped += 1;
                tracing::debug!("Skipping malformed line {}: {}", index + 1, line);
            }
        }
    }

    (store, summary)
}

fn parse_line(line: &str) -> Option<GenotypeCall> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    let rsid = fields.first().filter(|id| !id.is_empty())?;

    let genotype = match fields.len() {
        0..=3 => return None,
        4 => {
            let mut symbols = fields[3].chars();
            match (symbols.next(), symbols.next(), symbols.next()) {
                (Some(a), Some(b), None) => Genotype::new(a, b),
                _ => return None,
            }
        }
        _ => Genotype::new(allele(fields[3])?, allele(fields[4])?),
    };

    Some(GenotypeCall::new(rsid, genotype))
}

fn allele(field: &str) -> Option<char> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some('0'), None) => Some('-'),
        (Some(c), None) => Some(c),
        _ => None,
    }
}
