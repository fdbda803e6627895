//! Enrichment of personal genotypes with SNPedia annotations
//!
//! # Components
//!
//! - `normalize`: strand correction of a genotype against the reference orientation
//! - `EnrichmentClassifier`: per-variant flags and display formatting
//! - `EnrichmentPipeline`: runs the classifier over every personal call
//! - `DatasetRefresh`: rebuilds the dataset file at crawl checkpoints

mod classifier;
mod orientation;
mod pipeline;

pub use classifier::EnrichmentClassifier;
pub use orientation::{complement, normalize};
pub use pipeline::{DatasetRefresh, EnrichmentPipeline, EnrichmentReport};
