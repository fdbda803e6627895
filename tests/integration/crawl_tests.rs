//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock SNPedia servers and test
//! the full fetch, parse and checkpoint cycle end-to-end.

use osgenome::config::{
    CacheConfig, CatalogueConfig, ClassifierConfig, Config, CrawlMode, CrawlerConfig,
    DataConfig, RetryConfig, UserAgentConfig,
};
use osgenome::crawler::{CheckpointHook, Crawler, FetchOutcome, RetryingFetcher};
use osgenome::enrich::DatasetRefresh;
use osgenome::model::{AnnotationRecord, Genotype, GenotypeCall, Orientation};
use osgenome::storage::{load_results, KnownSnps, PersonalStore, ReferenceStore};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, data_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: format!("{}/index.php", base_url),
            mode: CrawlMode::Concurrent,
            request_delay_ms: 10, // Very short for testing
            request_timeout_secs: 5,
            checkpoint_interval: 2,
            concurrency_floor: 3,
            concurrency_ceiling: 5,
            concurrency_factor: 5.0,
        },
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 20,
            flat_delay_ms: 10,
        },
        cache: CacheConfig::default(),
        catalogue: CatalogueConfig::default(),
        classifier: ClassifierConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        data: DataConfig {
            directory: data_dir.to_path_buf(),
            personal_file: "personal_snps.json".to_string(),
            reference_file: "results.json".to_string(),
            results_file: "result_table.json".to_string(),
        },
    }
}

fn snp_page(description: &str, orientation: &str, rows: &[[&str; 3]]) -> String {
    let rows: String = rows
        .iter()
        .map(|[geno, mag, summary]| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                geno, mag, summary
            )
        })
        .collect();

    format!(
        r##"<html><head><title>SNPedia</title></head><body>
<table style="border: 1px; background-color: #FFFFC0; border-style: solid; margin:1em; width:90%;">
<tr><td>{}</td></tr>
</table>
<table class="sortable smwtable">
<tr><th>Geno</th><th>Mag</th><th>Summary</th></tr>
{}
</table>
<table><tr><td>Rs_StabilizedOrientation</td><td>{}</td></tr></table>
</body></html>"##,
        description, rows, orientation
    )
}

async fn mount_page(server: &MockServer, rsid: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/index.php/{}", rsid)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn leftover_temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_concurrent() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    mount_page(
        &mock_server,
        "rs53576",
        snp_page("Oxytocin receptor", "minus", &[["(A;A)", "2.5", "Lack of empathy?"], ["(G;G)", "0", "common"]]),
    )
    .await;
    mount_page(&mock_server, "rs1815739", snp_page("ACTN3", "plus", &[["(C;C)", "2", "sprinter"]])).await;
    mount_page(&mock_server, "rs4680", snp_page("COMT", "", &[])).await;

    let crawler = Crawler::new(&config).unwrap();
    let mut store = ReferenceStore::new();
    let summary = crawler
        .crawl(&ids(&["rs53576", "RS1815739", "rs4680"]), &mut store, CrawlMode::Concurrent)
        .await
        .unwrap();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.abandoned, 0);

    let oxytocin = store.get("rs53576").unwrap();
    assert_eq!(oxytocin.description, "Oxytocin receptor");
    assert_eq!(oxytocin.orientation, Orientation::Minus);
    assert_eq!(oxytocin.variations.len(), 2);

    assert_eq!(store.get("rs1815739").unwrap().orientation, Orientation::Plus);
    let comt = store.get("rs4680").unwrap();
    assert_eq!(comt.orientation, Orientation::Unknown);
    assert!(comt.variations.is_empty());

    // The final checkpoint holds everything, and no temporary files remain
    let on_disk = ReferenceStore::load(&config.data.reference_path()).unwrap();
    assert_eq!(on_disk, store);
    assert!(leftover_temp_files(data_dir.path()).is_empty());
}

#[tokio::test]
async fn test_nothing_missing_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut store = ReferenceStore::new();
    store.insert(AnnotationRecord::new("rs1", "one", Vec::new(), Orientation::Plus));
    store.insert(AnnotationRecord::new("rs2", "two", Vec::new(), Orientation::Minus));
    let before = store.clone();

    let summary = Crawler::new(&config)
        .unwrap()
        .crawl(&ids(&["rs1", "rs2"]), &mut store, CrawlMode::Concurrent)
        .await
        .unwrap();

    assert_eq!(summary.already_present, 2);
    assert_eq!(summary.attempted(), 0);
    assert_eq!(store, before);
    assert!(!config.data.reference_path().exists());
}

#[tokio::test]
async fn test_sequential_and_concurrent_agree() {
    let mock_server = MockServer::start().await;
    let identifiers: Vec<String> = (1..=6).map(|i| format!("rs{}", i)).collect();

    for rsid in &identifiers {
        Mock::given(method("GET"))
            .and(path(format!("/index.php/{}", rsid)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(snp_page(rsid, "plus", &[["(A;A)", "0", "common"]])),
            )
            .expect(2)
            .mount(&mock_server)
            .await;
    }

    let dir_a = TempDir::new().unwrap();
    let mut sequential = ReferenceStore::new();
    Crawler::new(&create_test_config(&mock_server.uri(), dir_a.path()))
        .unwrap()
        .crawl(&identifiers, &mut sequential, CrawlMode::Sequential)
        .await
        .unwrap();

    let dir_b = TempDir::new().unwrap();
    let mut concurrent = ReferenceStore::new();
    Crawler::new(&create_test_config(&mock_server.uri(), dir_b.path()))
        .unwrap()
        .crawl(&identifiers, &mut concurrent, CrawlMode::Concurrent)
        .await
        .unwrap();

    assert_eq!(sequential.len(), 6);
    assert_eq!(sequential, concurrent);
}

#[tokio::test]
async fn test_rate_limited_identifier_is_abandoned_after_max_attempts() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/index.php/rs429"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = RetryingFetcher::from_config(&config).unwrap();
    let report = fetcher.fetch(&config.crawler.page_url("rs429")).await;

    assert_eq!(report.outcome, FetchOutcome::RateLimited);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.delays.len(), 2);
    assert!(report.delays[1] >= report.delays[0] * 2);
}

#[tokio::test]
async fn test_abandoned_identifier_stays_absent() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/index.php/rs503"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "rs1", snp_page("fine", "plus", &[])).await;

    let mut store = ReferenceStore::new();
    let summary = Crawler::new(&config)
        .unwrap()
        .crawl(&ids(&["rs503", "rs1"]), &mut store, CrawlMode::Sequential)
        .await
        .unwrap();

    assert_eq!(summary.abandoned, 1);
    assert_eq!(summary.fetched, 1);
    assert!(!store.contains("rs503"));
    assert!(store.contains("rs1"));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/index.php/rs404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = RetryingFetcher::from_config(&config)
        .unwrap()
        .fetch(&config.crawler.page_url("rs404"))
        .await;

    assert_eq!(report.outcome, FetchOutcome::NotFound);
    assert_eq!(report.attempts, 1);
}

#[tokio::test]
async fn test_server_error_recovers() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/index.php/rs7"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "rs7", snp_page("recovered", "plus", &[])).await;

    let report = RetryingFetcher::from_config(&config)
        .unwrap()
        .fetch(&config.crawler.page_url("rs7"))
        .await;

    assert!(report.is_success());
    assert_eq!(report.attempts, 2);
    assert_eq!(report.delays, vec![Duration::from_millis(20)]);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), data_dir.path());
    config.crawler.request_timeout_secs = 1;
    config.retry.max_attempts = 2;

    Mock::given(method("GET"))
        .and(path("/index.php/rsslow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let report = RetryingFetcher::from_config(&config)
        .unwrap()
        .fetch(&config.crawler.page_url("rsslow"))
        .await;

    assert!(matches!(report.outcome, FetchOutcome::NetworkFailure(_)));
    assert_eq!(report.attempts, 2);
    assert_eq!(report.delays, vec![Duration::from_millis(10)]);
}

#[tokio::test]
async fn test_identifiers_missing_from_catalogue_are_not_requested() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    mount_page(&mock_server, "rs1", snp_page("listed", "plus", &[])).await;
    Mock::given(method("GET"))
        .and(path("/index.php/i700"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let known: KnownSnps = ["Rs1", "Rs2"].into_iter().collect();
    let mut store = ReferenceStore::new();
    let summary = Crawler::new(&config)
        .unwrap()
        .with_known_snps(known)
        .crawl(&ids(&["rs1", "i700"]), &mut store, CrawlMode::Concurrent)
        .await
        .unwrap();

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.not_in_catalogue, 1);
    assert!(!store.contains("i700"));
}

/// Rebuilds the dataset, then notes how many rows the file on disk holds
struct ObservedRefresh {
    refresh: DatasetRefresh,
    results_path: std::path::PathBuf,
    rows_seen: Mutex<Vec<usize>>,
}

impl CheckpointHook for ObservedRefresh {
    fn after_checkpoint(&self, store: &ReferenceStore) {
        self.refresh.after_checkpoint(store);
        let rows = load_results(&self.results_path).unwrap().unwrap().len();
        self.rows_seen.lock().unwrap().push(rows);
    }
}

#[tokio::test]
async fn test_dataset_grows_at_each_checkpoint() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    let identifiers: Vec<String> = (1..=5).map(|i| format!("rs{}", i)).collect();
    for rsid in &identifiers {
        mount_page(&mock_server, rsid, snp_page(rsid, "plus", &[["(A;G)", "1", "carrier"]])).await;
    }

    let personal: PersonalStore = identifiers
        .iter()
        .map(|rsid| GenotypeCall::new(rsid, Genotype::Called('A', 'G')))
        .collect();
    let hook = Arc::new(ObservedRefresh {
        refresh: DatasetRefresh::from_config(&config, Arc::new(personal)),
        results_path: config.data.results_path(),
        rows_seen: Mutex::new(Vec::new()),
    });

    let mut store = ReferenceStore::new();
    let summary = Crawler::new(&config)
        .unwrap()
        .with_checkpoint_hook(hook.clone())
        .crawl(&identifiers, &mut store, CrawlMode::Sequential)
        .await
        .unwrap();

    assert_eq!(summary.fetched, 5);
    // Periodic checkpoints after 2 and 4 pages; the final one does not refresh
    assert_eq!(*hook.rows_seen.lock().unwrap(), vec![2, 4]);
}
