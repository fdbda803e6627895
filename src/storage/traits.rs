//! Storage traits and error types
//!
//! This module defines the read interfaces the enrichment pipeline consumes and the
//! error type shared by all file-backed stores.

use crate::model::{AnnotationRecord, GenotypeCall};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unexpected data layout in {path:?}: {message}")]
    Layout { path: PathBuf, message: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn layout(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Layout {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Source of personal genotype calls
pub trait GenotypeSource {
    /// All calls, in identifier order
    fn calls(&self) -> Box<dyn Iterator<Item = GenotypeCall> + '_>;

    /// Number of calls held
    fn call_count(&self) -> usize;
}

/// Source of reference annotations
pub trait AnnotationSource {
    /// Looks up the record for a canonical (lower-case) identifier
    fn annotation(&self, rsid: &str) -> Option<&AnnotationRecord>;
}
