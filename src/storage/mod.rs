//! Storage module for persisting genotype and annotation data
//!
//! This module handles all file operations for the pipeline, including:
//! - The personal genotype store and raw export import
//! - The reference annotation store filled by the crawler
//! - The enriched dataset written by the enrichment pipeline
//! - The cached catalogue of identifiers SNPedia has pages for
//!
//! Every write goes through a temporary file and an atomic rename.

mod import;
mod json;
mod known;
mod personal;
mod reference;
mod results;
mod traits;

pub use import::{import_raw, parse_raw_export, ImportSummary};
pub use known::KnownSnps;
pub use personal::PersonalStore;
pub use reference::ReferenceStore;
pub use results::{load_results, save_results};
pub use traits::{AnnotationSource, GenotypeSource, StorageError, StorageResult};
