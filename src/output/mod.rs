//! Output module for dataset summaries
//!
//! This module handles:
//! - Computing statistics over an enriched dataset
//! - Printing statistics and crawl summaries for the command line

pub mod stats;

pub use stats::{print_statistics, DatasetStatistics};

use crate::crawler::CrawlSummary;
use crate::enrich::EnrichmentReport;

/// Prints a crawl summary to stdout
pub fn print_crawl_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");
    println!("  Started: {}", summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Duration: {}s", summary.duration().num_seconds());
    println!("  Identifiers requested: {}", summary.requested);
    println!("  Already present: {}", summary.already_present);
    if summary.not_in_catalogue > 0 {
        println!("  Not on SNPedia (skipped): {}", summary.not_in_catalogue);
    }
    println!("  Fetched: {}", summary.fetched);
    println!("  Not found: {}", summary.not_found);
    println!("  Abandoned (retry next run): {}", summary.abandoned);
    if summary.worker_failures > 0 {
        println!("  Failed fetch tasks (retry next run): {}", summary.worker_failures);
    }
    if summary.checkpoint_failures > 0 {
        println!("  Failed checkpoints: {}", summary.checkpoint_failures);
    }
    println!();
}

/// Prints an enrichment report to stdout
pub fn print_enrichment_report(report: &EnrichmentReport) {
    println!("=== Enrichment ===\n");
    println!("  Personal calls: {}", report.total_calls);
    println!("  Enriched: {}", report.enriched);
    println!("  Without reference data: {}", report.missing_reference);
    println!("  No-calls skipped: {}", report.no_calls);
    if report.legacy_records > 0 {
        println!("  Old-format records: {}", report.legacy_records);
    }
    if report.unknown_orientation > 0 {
        println!("  Without orientation: {}", report.unknown_orientation);
    }
    println!();
}
