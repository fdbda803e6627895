//! Crawler module for SNPedia page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Listing the identifiers SNPedia has pages for
//! - Variant page parsing
//! - Request scheduling and rate limiting
//! - Overall crawl coordination with checkpointing

mod catalogue;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use crate::config::CrawlMode;
pub use catalogue::{fetch_known_snps, load_or_fetch_known_snps};
pub use coordinator::{CheckpointHook, CrawlSummary, Crawler};
pub use fetcher::{
    build_http_client, FailureClass, FetchOutcome, FetchReport, HttpTransport, RetryPolicy,
    RetryingFetcher, Transport, TransportError, TransportResponse,
};
pub use parser::parse_snp_page;
pub use scheduler::{ScheduledFetch, Scheduler};

use crate::config::Config;
use crate::storage::ReferenceStore;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client
/// 2. Load the reference store (empty on first run)
/// 3. Fetch every identifier the store lacks, in the configured mode
/// 4. Checkpoint the store along the way and once at the end
///
/// The returned store is the in-memory result, including records whose final
/// checkpoint may have failed.
pub async fn crawl(
    config: &Config,
    identifiers: &[String],
    mode: CrawlMode,
) -> crate::Result<(ReferenceStore, CrawlSummary)> {
    let crawler = Crawler::new(config)?;
    let mut store = ReferenceStore::load(&config.data.reference_path())?;
    let summary = crawler.crawl(identifiers, &mut store, mode).await?;
    Ok((store, summary))
}
