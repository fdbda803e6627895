//! Classification and display formatting of one variant
//!
//! A significance text counts as *common* when it begins, case-insensitively, with one
//! of the configured common phrases. A variant is:
//! - **interesting** when any of its rows has a significance that is not common
//! - **uncommon** when the row matching the individual's (strand-corrected) genotype has
//!   a significance that is not common and carries no exclusion marker

use crate::config::ClassifierConfig;
use crate::enrich::orientation::normalize;
use crate::model::{AnnotationRecord, EnrichedRecord, Genotype, GenotypeCall, VariationRow};

/// Merges personal calls with annotations and flags notable variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentClassifier {
    common_phrases: Vec<String>,
    exclusion_markers: Vec<String>,
}

impl Default for EnrichmentClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl EnrichmentClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self {
            common_phrases: lower(&config.common_phrases),
            exclusion_markers: lower(&config.exclusion_markers),
        }
    }

    pub fn is_common(&self, significance: &str) -> bool {
        let significance = significance.trim().to_lowercase();
        self.common_phrases
            .iter()
            .any(|phrase| significance.starts_with(phrase.as_str()))
    }

    fn is_excluded(&self, significance: &str) -> bool {
        let significance = significance.to_lowercase();
        self.exclusion_markers
            .iter()
            .any(|marker| significance.contains(marker.as_str()))
    }

    /// A row with a significance that is not common
    ///
    /// Rows without a significance cell are never interesting.
    pub fn row_is_interesting(&self, row: &VariationRow) -> bool {
        row.significance()
            .map(|significance| !self.is_common(significance))
            .unwrap_or(false)
    }

    /// An interesting, non-excluded row whose genotype equals `genotype`
    pub fn row_is_uncommon(&self, row: &VariationRow, genotype: &str) -> bool {
        row.genotype() == Some(genotype)
            && self.row_is_interesting(row)
            && row
                .significance()
                .map(|significance| !self.is_excluded(significance))
                .unwrap_or(false)
    }

    /// Builds the enriched record for one call
    ///
    /// Returns `None` for a no-call, which has nothing to match against.
    pub fn classify(&self, call: &GenotypeCall, record: &AnnotationRecord) -> Option<EnrichedRecord> {
        if call.genotype.is_unknown() {
            return None;
        }

        let (corrected, flipped) = normalize(call.genotype, record.orientation);
        let corrected_text = corrected.to_string();

        let is_interesting = record
            .variations
            .iter()
            .any(|row| self.row_is_interesting(row));
        let is_uncommon = record
            .variations
            .iter()
            .any(|row| self.row_is_uncommon(row, &corrected_text));

        let variations = record
            .variations
            .iter()
            .map(|row| format_row(row, &corrected_text))
            .collect::<Vec<_>>()
            .join("<br>");

        Some(EnrichedRecord {
            rsid: record.rsid.clone(),
            description: record.description.clone(),
            genotype: display_genotype(call.genotype, corrected, flipped),
            variations,
            orientation: record.orientation.label().to_string(),
            is_interesting,
            is_uncommon,
        })
    }
}

/// Row cells joined by spaces, in bold when the row is the carried genotype
fn format_row(row: &VariationRow, genotype: &str) -> String {
    if row.genotype() == Some(genotype) {
        format!("<b>{}</b>", row.to_text())
    } else {
        row.to_text()
    }
}

fn display_genotype(original: Genotype, corrected: Genotype, flipped: bool) -> String {
    if flipped {
        format!("{}<br><i>flipped<br>{}</i>", original, corrected)
    } else {
        original.to_string()
    }
}
