//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Selecting the identifiers missing from the reference store
//! - Skipping identifiers the SNPedia catalogue has no page for
//! - Running one fetch task per identifier under the concurrency cap and pacing delay
//! - Collecting parsed records into the store
//! - Periodic and final checkpoints, with an optional hook after each periodic one
//!
//! Tasks never touch the store. They send results over a channel to a single
//! collector, which owns the store and performs every checkpoint write.

use crate::config::{Config, CrawlMode, CrawlerConfig};
use crate::crawler::fetcher::{FetchOutcome, RetryingFetcher, Transport};
use crate::crawler::parser::parse_snp_page;
use crate::crawler::scheduler::Scheduler;
use crate::model::{canonical_rsid, AnnotationRecord};
use crate::storage::{KnownSnps, ReferenceStore};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Counts and timings of one crawl pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Distinct identifiers requested
    pub requested: usize,
    /// Identifiers already in the store when the crawl started
    pub already_present: usize,
    /// Missing identifiers skipped because the catalogue does not list them
    pub not_in_catalogue: usize,
    pub fetched: usize,
    pub not_found: usize,
    /// Identifiers given up on after exhausting retries
    pub abandoned: usize,
    /// Fetch tasks that panicked; their identifiers stay absent
    pub worker_failures: usize,
    pub checkpoints_written: usize,
    pub checkpoint_failures: usize,
}

impl CrawlSummary {
    fn new(started_at: DateTime<Utc>, requested: usize) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            requested,
            already_present: 0,
            not_in_catalogue: 0,
            fetched: 0,
            not_found: 0,
            abandoned: 0,
            worker_failures: 0,
            checkpoints_written: 0,
            checkpoint_failures: 0,
        }
    }

    /// Identifiers a fetch was attempted for
    pub fn attempted(&self) -> usize {
        self.fetched + self.not_found + self.abandoned
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Called after every successful periodic checkpoint
///
/// Runs on the collector, so the crawl waits for it. The final checkpoint does not
/// trigger it; callers act on the returned store instead.
pub trait CheckpointHook: Send + Sync {
    fn after_checkpoint(&self, store: &ReferenceStore);
}

/// Result of fetching and parsing one identifier
#[derive(Debug)]
enum PageResult {
    Fetched(AnnotationRecord),
    NotFound(String),
    Abandoned(String, FetchOutcome),
}

/// Main crawler structure
pub struct Crawler {
    fetcher: RetryingFetcher,
    settings: CrawlerConfig,
    checkpoint_path: PathBuf,
    known: Option<KnownSnps>,
    hook: Option<Arc<dyn CheckpointHook>>,
}

impl Crawler {
    /// Creates a crawler fetching over HTTP
    pub fn new(config: &Config) -> crate::Result<Self> {
        Ok(Self::with_fetcher(config, RetryingFetcher::from_config(config)?))
    }

    /// Creates a crawler over a custom transport, keeping the configured retry policy
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let fetcher = RetryingFetcher::new(
            transport,
            (&config.retry).into(),
            config.crawler.request_timeout(),
        );
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: &Config, fetcher: RetryingFetcher) -> Self {
        Self {
            fetcher,
            settings: config.crawler.clone(),
            checkpoint_path: config.data.reference_path(),
            known: None,
            hook: None,
        }
    }

    /// Restricts crawling to identifiers listed in `known`
    pub fn with_known_snps(mut self, known: KnownSnps) -> Self {
        self.known = Some(known);
        self
    }

    pub fn with_checkpoint_hook(mut self, hook: Arc<dyn CheckpointHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// The fetcher page requests go through
    pub fn fetcher(&self) -> &RetryingFetcher {
        &self.fetcher
    }

    /// Path checkpoints are written to
    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    /// Fetches every identifier missing from `store`
    ///
    /// The set of identifiers already present is snapshotted once, before any fetch.
    /// When nothing is missing no request is made and the store file is not touched.
    pub async fn crawl(
        &self,
        identifiers: &[String],
        store: &mut ReferenceStore,
        mode: CrawlMode,
    ) -> crate::Result<CrawlSummary> {
        let started_at = Utc::now();
        let already_have = store.identifiers();

        let mut seen = HashSet::new();
        let requested: Vec<String> = identifiers
            .iter()
            .map(|rsid| canonical_rsid(rsid))
            .filter(|rsid| !rsid.is_empty() && seen.insert(rsid.clone()))
            .collect();

        let mut summary = CrawlSummary::new(started_at, requested.len());
        let mut to_fetch = Vec::new();
        for rsid in requested {
            if already_have.contains(&rsid) {
                summary.already_present += 1;
            } else if self.known.as_ref().is_some_and(|known| !known.contains(&rsid)) {
                summary.not_in_catalogue += 1;
            } else {
                to_fetch.push(rsid);
            }
        }

        if summary.not_in_catalogue > 0 {
            tracing::info!(
                "Skipping {} identifiers SNPedia has no page for",
                summary.not_in_catalogue
            );
        }

        if to_fetch.is_empty() {
            tracing::info!(
                "Nothing to fetch ({} of {} identifiers already present)",
                summary.already_present,
                summary.requested
            );
            summary.finished_at = Utc::now();
            return Ok(summary);
        }

        tracing::info!(
            "Crawling {} of {} identifiers ({} mode)",
            to_fetch.len(),
            summary.requested,
            match mode {
                CrawlMode::Sequential => "sequential",
                CrawlMode::Concurrent => "concurrent",
            }
        );

        let mut collector = Collector {
            store,
            path: &self.checkpoint_path,
            interval: self.settings.checkpoint_interval.max(1) as usize,
            total: to_fetch.len(),
            completed: 0,
            hook: self.hook.as_deref(),
            summary: &mut summary,
        };

        match mode {
            CrawlMode::Sequential => self.run_sequential(to_fetch, &mut collector).await,
            CrawlMode::Concurrent => self.run_concurrent(to_fetch, &mut collector).await,
        }

        collector.checkpoint(false);

        summary.finished_at = Utc::now();
        tracing::info!(
            "Crawl completed: {} fetched, {} not found, {} abandoned in {}s",
            summary.fetched,
            summary.not_found,
            summary.abandoned,
            summary.duration().num_seconds()
        );
        Ok(summary)
    }

    async fn run_sequential(&self, to_fetch: Vec<String>, collector: &mut Collector<'_>) {
        let delay = self.settings.request_delay();
        for (index, rsid) in to_fetch.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let result = fetch_and_parse(&self.fetcher, &self.settings, rsid).await;
            collector.record(result);
        }
    }

    /// One task per identifier; the scheduler's slots bound how many fetch at once
    async fn run_concurrent(&self, to_fetch: Vec<String>, collector: &mut Collector<'_>) {
        let concurrency = self.settings.concurrency();
        let scheduler = Arc::new(Scheduler::new(concurrency, self.settings.request_delay()));
        let settings = Arc::new(self.settings.clone());

        tracing::debug!(
            "Spawning {} fetch tasks over {} request slots",
            to_fetch.len(),
            concurrency
        );

        let (tx, mut rx) = mpsc::channel(concurrency * 2);
        let mut tasks = JoinSet::new();

        for rsid in to_fetch {
            let scheduler = scheduler.clone();
            let fetcher = self.fetcher.clone();
            let settings = settings.clone();
            let tx = tx.clone();

            tasks.spawn(async move {
                let Some(slot) = scheduler.acquire(rsid).await else {
                    return;
                };
                let result = fetch_and_parse(&fetcher, &settings, &slot.rsid).await;
                if tx.send(result).await.is_ok() {
                    slot.finish().await;
                }
            });
        }
        drop(tx);

        while let Some(result) = rx.recv().await {
            collector.record(result);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                collector.summary.worker_failures += 1;
                tracing::error!("Fetch task failed, identifier left for the next crawl: {}", e);
            }
        }
    }
}

async fn fetch_and_parse(fetcher: &RetryingFetcher, settings: &CrawlerConfig, rsid: &str) -> PageResult {
    tracing::info!("Grabbing data about SNP: {}", rsid);
    let report = fetcher.fetch(&settings.page_url(rsid)).await;

    match report.outcome {
        FetchOutcome::Success(html) => PageResult::Fetched(parse_snp_page(rsid, &html)),
        FetchOutcome::NotFound => PageResult::NotFound(rsid.to_string()),
        other => PageResult::Abandoned(rsid.to_string(), other),
    }
}

/// Owns the store for the duration of a crawl
struct Collector<'a> {
    store: &'a mut ReferenceStore,
    path: &'a Path,
    interval: usize,
    total: usize,
    completed: usize,
    hook: Option<&'a dyn CheckpointHook>,
    summary: &'a mut CrawlSummary,
}

impl Collector<'_> {
    fn record(&mut self, result: PageResult) {
        match result {
            PageResult::Fetched(record) => {
                self.store.insert(record);
                self.summary.fetched += 1;
            }
            PageResult::NotFound(_) => self.summary.not_found += 1,
            PageResult::Abandoned(rsid, outcome) => {
                tracing::debug!("Abandoned {} for this pass: {:?}", rsid, outcome);
                self.summary.abandoned += 1;
            }
        }

        self.completed += 1;
        if self.completed % 10 == 0 {
            tracing::info!(
                "Progress: {}/{} identifiers processed ({:.1}%)",
                self.completed,
                self.total,
                self.completed as f64 * 100.0 / self.total as f64
            );
        }

        if self.completed % self.interval == 0 && self.completed < self.total {
            self.checkpoint(true);
        }
    }

    /// Persists the store; failures are logged and retried at the next checkpoint
    fn checkpoint(&mut self, periodic: bool) {
        match self.store.save(self.path) {
            Ok(()) => {
                self.summary.checkpoints_written += 1;
                tracing::debug!(
                    "Checkpoint: {} records saved to {}",
                    self.store.len(),
                    self.path.display()
                );
                if periodic {
                    if let Some(hook) = self.hook {
                        hook.after_checkpoint(self.store);
                    }
                }
            }
            Err(e) => {
                self.summary.checkpoint_failures += 1;
                tracing::error!("Checkpoint failed, continuing in memory: {}", e);
            }
        }
    }
}
