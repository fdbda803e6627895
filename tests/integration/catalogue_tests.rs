//! Integration tests for the SNPedia catalogue listing
//!
//! A mock MediaWiki API serves `Category:Is_a_snp` in pages linked by `cmcontinue`
//! tokens. The listing must follow every token, cache the result, and refuse to
//! cache a listing that broke off part way.

use osgenome::config::{
    CacheConfig, CatalogueConfig, ClassifierConfig, Config, CrawlMode, CrawlerConfig,
    DataConfig, RetryConfig, UserAgentConfig,
};
use osgenome::crawler::{load_or_fetch_known_snps, RetryingFetcher};
use osgenome::storage::KnownSnps;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

fn create_test_config(base_url: &str, data_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: format!("{}/index.php", base_url),
            mode: CrawlMode::Concurrent,
            request_delay_ms: 10,
            request_timeout_secs: 5,
            checkpoint_interval: 2,
            concurrency_floor: 3,
            concurrency_ceiling: 5,
            concurrency_factor: 5.0,
        },
        retry: RetryConfig {
            max_attempts: 2,
            base_delay_ms: 10,
            flat_delay_ms: 10,
        },
        cache: CacheConfig::default(),
        catalogue: CatalogueConfig {
            page_limit: 2,
            ..CatalogueConfig::default()
        },
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

/// Matches the opening request of a listing, which carries no continuation token
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "cmcontinue")
    }
}

fn members(titles: &[&str]) -> serde_json::Value {
    let members: Vec<serde_json::Value> = titles
        .iter()
        .map(|title| json!({"ns": 0, "title": title}))
        .collect();
    json!(members)
}

async fn mount_three_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("list", "categorymembers"))
        .and(query_param("cmtitle", "Category:Is_a_snp"))
        .and(query_param("cmlimit", "2"))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": {"cmcontinue": "page|2", "continue": "-||"},
            "query": {"categorymembers": members(&["Rs53576", "Rs1815739"])}
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("cmcontinue", "page|2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": {"cmcontinue": "page|3", "continue": "-||"},
            "query": {"categorymembers": members(&["Rs4680", "Rs1801133"])}
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("cmcontinue", "page|3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": {"categorymembers": members(&["Rs7412"])}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_listing_follows_every_continuation() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());
    mount_three_pages(&mock_server).await;

    let fetcher = RetryingFetcher::from_config(&config).unwrap();
    let known = load_or_fetch_known_snps(&config, &fetcher).await.unwrap();

    assert_eq!(known.len(), 5);
    for rsid in ["rs53576", "rs1815739", "rs4680", "rs1801133", "rs7412"] {
        assert!(known.contains(rsid), "{} missing", rsid);
    }

    let cached = KnownSnps::load(&config.catalogue_path()).unwrap().unwrap();
    assert_eq!(cached, known);
}

#[tokio::test]
async fn test_cached_catalogue_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());
    mount_three_pages(&mock_server).await;

    let fetcher = RetryingFetcher::from_config(&config).unwrap();
    let first = load_or_fetch_known_snps(&config, &fetcher).await.unwrap();
    // Each page mock expects exactly one hit across both calls
    let second = load_or_fetch_known_snps(&config, &fetcher).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_failed_page_leaves_no_cache() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": {"cmcontinue": "page|2"},
            "query": {"categorymembers": members(&["Rs1"])}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("cmcontinue", "page|2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = RetryingFetcher::from_config(&config).unwrap();
    let result = load_or_fetch_known_snps(&config, &fetcher).await;

    assert!(result.is_err());
    assert!(!config.catalogue_path().exists());
}

#[tokio::test]
async fn test_malformed_listing_is_an_error() {
    let mock_server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), data_dir.path());

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = RetryingFetcher::from_config(&config).unwrap();
    assert!(load_or_fetch_known_snps(&config, &fetcher).await.is_err());
    assert!(!config.catalogue_path().exists());
}
