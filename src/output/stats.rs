//! Statistics over the enriched dataset
//!
//! This module provides functionality for summarising and displaying an enriched
//! dataset.

use crate::model::EnrichedRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Dataset statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStatistics {
    /// Total number of enriched records
    pub total: usize,

    pub interesting: usize,

    pub uncommon: usize,

    /// Records whose genotype was strand-corrected
    pub flipped: usize,

    /// Count of records by orientation label
    pub by_orientation: BTreeMap<String, usize>,
}

impl DatasetStatistics {
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            stats.interesting += usize::from(record.is_interesting);
            stats.uncommon += usize::from(record.is_uncommon);
            stats.flipped += usize::from(record.is_flipped());

            let label = if record.orientation.is_empty() {
                "unknown".to_string()
            } else {
                record.orientation.clone()
            };
            *stats.by_orientation.entry(label).or_insert(0) += 1;
        }

        stats
    }

    fn percentage(&self, count: usize) -> f64 {
        if self.total > 0 {
            count as f64 * 100.0 / self.total as f64
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total);
    println!(
        "  Interesting: {} ({:.1}%)",
        stats.interesting,
        stats.percentage(stats.interesting)
    );
    println!(
        "  Uncommon: {} ({:.1}%)",
        stats.uncommon,
        stats.percentage(stats.uncommon)
    );
    println!("  Flipped genotypes: {}", stats.flipped);
    println!();

    println!("Records by Orientation:");
    let mut counts: Vec<_> = stats.by_orientation.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1));
    for (label, count) in counts {
        println!("  {}: {} ({:.1}%)", label, count, stats.percentage(*count));
    }
}
