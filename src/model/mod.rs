//! Data model shared by the crawler, the enrichment pipeline and the cache
//!
//! # Components
//!
//! - `Genotype` / `GenotypeCall`: an individual's two-allele call for one variant
//! - `AnnotationRecord` / `VariationRow` / `Orientation`: SNPedia reference data
//! - `EnrichedRecord`: the merged, classified output row

mod annotation;
mod enriched;
mod genotype;

pub use annotation::{AnnotationRecord, Orientation, VariationRow};
pub use enriched::EnrichedRecord;
pub use genotype::{canonical_rsid, Genotype, GenotypeCall, GenotypeError};
