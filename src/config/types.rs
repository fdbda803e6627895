use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for OSGenome
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub catalogue: CatalogueConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub data: DataConfig,
}

/// How the crawl drives its requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// One request at a time with a pacing delay in between
    Sequential,
    /// One task per identifier, capped by a semaphore
    #[default]
    Concurrent,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Page URL prefix; the identifier is appended as a path segment
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sequential or concurrent driver
    #[serde(default)]
    pub mode: CrawlMode,

    /// Delay a request slot observes after each request (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Persist the reference store after this many completed fetches
    #[serde(rename = "checkpoint-interval")]
    pub checkpoint_interval: u32,

    /// Lower bound on simultaneous in-flight fetches
    #[serde(rename = "concurrency-floor")]
    pub concurrency_floor: u32,

    /// Upper bound on simultaneous in-flight fetches
    #[serde(rename = "concurrency-ceiling")]
    pub concurrency_ceiling: u32,

    /// Workers per second of request delay, before clamping
    #[serde(rename = "concurrency-factor")]
    pub concurrency_factor: f64,
}

impl Config {
    /// Endpoint of the SNPedia catalogue API
    ///
    /// Defaults to `api.php` next to the page base URL.
    pub fn catalogue_url(&self) -> Result<Url, url::ParseError> {
        match &self.catalogue.api_url {
            Some(explicit) => Url::parse(explicit),
            None => Url::parse(&self.crawler.base_url)?.join("api.php"),
        }
    }

    pub fn catalogue_path(&self) -> PathBuf {
        self.data.directory.join(&self.catalogue.file)
    }
}

impl CrawlerConfig {
    /// URL of one variant page: `{base-url}/{rsid}`
    pub fn page_url(&self, rsid: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), rsid)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Request slots for the concurrent driver
    ///
    /// `max(floor, min(ceiling, floor(factor * delay_secs)))`, so a slower pace allows more
    /// requests in flight while the aggregate rate stays bounded.
    pub fn concurrency(&self) -> usize {
        let scaled = (self.concurrency_factor * self.request_delay().as_secs_f64()).floor();
        let scaled = if scaled.is_finite() && scaled > 0.0 {
            scaled as u32
        } else {
            0
        };
        scaled
            .min(self.concurrency_ceiling)
            .max(self.concurrency_floor) as usize
    }
}

/// Retry and backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per identifier, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff for rate limiting and server errors (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Flat delay after network failures (milliseconds)
    #[serde(rename = "flat-delay-ms")]
    pub flat_delay_ms: u64,
}

/// Dataset cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "max-entries")]
    pub max_entries: usize,

    #[serde(rename = "ttl-secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl_secs: 3600,
        }
    }
}

/// Catalogue of identifiers SNPedia has a page for
///
/// When enabled, only personal identifiers listed in the catalogue are crawled.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// MediaWiki API endpoint; derived from `crawler.base-url` when absent
    #[serde(rename = "api-url", default)]
    pub api_url: Option<String>,

    /// Cached catalogue file in the data directory
    #[serde(default = "default_catalogue_file")]
    pub file: String,

    /// Category members requested per API page (the API caps this at 500)
    #[serde(rename = "page-limit", default = "default_page_limit")]
    pub page_limit: u32,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: None,
            file: default_catalogue_file(),
            page_limit: default_page_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_catalogue_file() -> String {
    "snpedia_snps.json".to_string()
}

fn default_page_limit() -> u32 {
    500
}

/// Phrases that decide whether an annotation is notable
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// A significance text starting with one of these is considered common
    #[serde(rename = "common-phrases", default = "default_common_phrases")]
    pub common_phrases: Vec<String>,

    /// A matching row whose significance contains one of these is never uncommon
    #[serde(rename = "exclusion-markers", default = "default_exclusion_markers")]
    pub exclusion_markers: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            common_phrases: default_common_phrases(),
            exclusion_markers: default_exclusion_markers(),
        }
    }
}

fn default_common_phrases() -> Vec<String> {
    [
        "common",
        "very common",
        "most common",
        "normal",
        "average",
        "miscall in ancestry",
        "ancestry miscall",
        "miscall by ancestry",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclusion_markers() -> Vec<String> {
    vec!["common in clinvar".to_string()]
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Locations of the JSON data files
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory holding all data files
    pub directory: PathBuf,

    /// Identifier → genotype map
    #[serde(rename = "personal-file")]
    pub personal_file: String,

    /// Identifier → annotation record map, written by the crawler
    #[serde(rename = "reference-file")]
    pub reference_file: String,

    /// Enriched dataset, written by the pipeline
    #[serde(rename = "results-file")]
    pub results_file: String,
}

impl DataConfig {
    pub fn personal_path(&self) -> PathBuf {
        self.directory.join(&self.personal_file)
    }

    pub fn reference_path(&self) -> PathBuf {
        self.directory.join(&self.reference_file)
    }

    pub fn results_path(&self) -> PathBuf {
        self.directory.join(&self.results_file)
    }
}
