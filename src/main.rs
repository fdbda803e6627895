//! OSGenome main entry point
//!
//! This is the command-line interface for the OSGenome enrichment engine.

use clap::Parser;
use osgenome::config::{load_config_with_hash, Config, CrawlMode};
use osgenome::crawler::{load_or_fetch_known_snps, Crawler};
use osgenome::enrich::DatasetRefresh;
use osgenome::output::{
    print_crawl_summary, print_enrichment_report, print_statistics, DatasetStatistics,
};
use osgenome::storage::{import_raw, KnownSnps, PersonalStore, ReferenceStore};
use osgenome::{DatasetCache, EnrichmentPipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// OSGenome: personal genotype enrichment from SNPedia
///
/// OSGenome fetches the SNPedia page of every variant in a personal genotype
/// export, corrects genotypes for strand orientation, and writes a classified
/// dataset of interesting and uncommon variants.
#[derive(Parser, Debug)]
#[command(name = "osgenome")]
#[command(version = "1.0.0")]
#[command(about = "Personal genotype enrichment from SNPedia", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Import a raw genotype export (Ancestry or 23andMe) into the personal store first
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Fetch one page at a time instead of concurrently
    #[arg(long)]
    sequential: bool,

    /// Skip the crawl and rebuild the dataset from existing reference data
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    enrich_only: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with_all = ["stats", "enrich_only"])]
    dry_run: bool,

    /// Show statistics of the enriched dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "enrich_only"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(raw) = &cli.import {
        handle_import(&config, raw)?;
    }

    let mode = if cli.sequential {
        CrawlMode::Sequential
    } else {
        config.crawler.mode
    };

    if cli.dry_run {
        handle_dry_run(&config, mode)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.enrich_only {
        let personal = PersonalStore::load(&config.data.personal_path())?;
        let reference = ReferenceStore::load(&config.data.reference_path())?;
        handle_enrich(&config, &personal, &reference)?;
    } else {
        handle_crawl_and_enrich(&config, mode).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("osgenome=info,warn"),
            1 => EnvFilter::new("osgenome=debug,info"),
            2 => EnvFilter::new("osgenome=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --import: converts a raw export into the personal store
fn handle_import(config: &Config, raw: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (store, summary) = import_raw(raw)?;
    let target = config.data.personal_path();
    store.save(&target)?;

    println!(
        "✓ Imported {} genotypes ({} no-calls, {} lines skipped) into {}",
        summary.imported,
        summary.no_calls,
        summary.skipped,
        target.display()
    );
    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config, mode: CrawlMode) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== OSGenome Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Mode: {:?}", mode);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Request slots: {}", config.crawler.concurrency());
    println!("  Checkpoint every: {} pages", config.crawler.checkpoint_interval);

    println!("\nRetry Policy:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Backoff base: {}ms", config.retry.base_delay_ms);
    println!("  Network retry delay: {}ms", config.retry.flat_delay_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nData:");
    println!("  Personal: {}", config.data.personal_path().display());
    println!("  Reference: {}", config.data.reference_path().display());
    println!("  Results: {}", config.data.results_path().display());

    println!("\nCatalogue:");
    println!("  Enabled: {}", config.catalogue.enabled);
    println!("  API: {}", config.catalogue_url()?);
    println!("  Cache: {}", config.catalogue_path().display());

    let personal = PersonalStore::load(&config.data.personal_path())?;
    let reference = ReferenceStore::load(&config.data.reference_path())?;
    let known = if config.catalogue.enabled {
        KnownSnps::load(&config.catalogue_path())?
    } else {
        None
    };

    let missing: Vec<String> = personal
        .identifiers()
        .into_iter()
        .filter(|rsid| !reference.contains(rsid))
        .collect();
    let listed = match &known {
        Some(known) => missing.iter().filter(|rsid| known.contains(rsid)).count(),
        None => missing.len(),
    };

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch {} of {} identifiers ({} already present, {} not on SNPedia)",
        listed,
        personal.len(),
        personal.len() - missing.len(),
        missing.len() - listed
    );
    if config.catalogue.enabled && known.is_none() {
        println!("  The catalogue has not been fetched yet; the crawl will list it first");
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics of the enriched dataset
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Dataset: {}\n", config.data.results_path().display());

    let cache = DatasetCache::from_config(config);
    match cache.get_all(&config.data.results_file)? {
        Some(dataset) => print_statistics(&DatasetStatistics::from_records(&dataset)),
        None => println!("No enriched dataset found; run a crawl first."),
    }

    Ok(())
}

/// Rebuilds the enriched dataset from the personal and reference stores
fn handle_enrich(
    config: &Config,
    personal: &PersonalStore,
    reference: &ReferenceStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = EnrichmentPipeline::from_config(config);
    let (records, report) =
        pipeline.run_and_save(personal, reference, &config.data.results_path())?;

    print_enrichment_report(&report);
    print_statistics(&DatasetStatistics::from_records(&records));
    Ok(())
}

/// Handles the main operation: crawl what is missing, then enrich
async fn handle_crawl_and_enrich(
    config: &Config,
    mode: CrawlMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let personal = Arc::new(PersonalStore::load(&config.data.personal_path())?);
    let mut reference = ReferenceStore::load(&config.data.reference_path())?;
    let mut crawler = Crawler::new(config)?
        .with_checkpoint_hook(Arc::new(DatasetRefresh::from_config(config, personal.clone())));

    if config.catalogue.enabled {
        let known = load_or_fetch_known_snps(config, crawler.fetcher()).await?;
        crawler = crawler.with_known_snps(known);
    }

    let identifiers = personal.identifiers();
    tracing::info!(
        "{} personal identifiers, {} reference records on disk",
        identifiers.len(),
        reference.len()
    );

    let summary = tokio::select! {
        result = crawler.crawl(&identifiers, &mut reference, mode) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!(
                "Interrupted; reference data remains at the last checkpoint in {}",
                crawler.checkpoint_path().display()
            );
            return Ok(());
        }
    };

    print_crawl_summary(&summary);
    handle_enrich(config, &personal, &reference)
}
