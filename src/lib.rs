//! OSGenome: personal genotype enrichment from SNPedia
//!
//! This crate crawls SNPedia for the variants present in a personal genotype export,
//! merges the reference annotations with the individual's calls (correcting for strand
//! orientation), and serves the classified dataset through a TTL/LRU cache.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod enrich;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for OSGenome operations
#[derive(Debug, Error)]
pub enum OsGenomeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Genotype error: {0}")]
    Genotype(#[from] model::GenotypeError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Catalogue listing failed: {0}")]
    Catalogue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for OSGenome operations
pub type Result<T> = std::result::Result<T, OsGenomeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{DataCache, DatasetCache, Page};
pub use config::Config;
pub use crawler::{CrawlMode, CrawlSummary, Crawler, RetryingFetcher};
pub use enrich::{normalize, EnrichmentClassifier, EnrichmentPipeline};
pub use model::{AnnotationRecord, EnrichedRecord, Genotype, GenotypeCall, Orientation};
