//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - The `Transport` abstraction the fetcher runs on (swappable in tests)
//! - Retry logic for transient failures
//! - Outcome classification
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 2xx | Success |
//! | HTTP 404 | Immediate → NotFound |
//! | HTTP 429 | Retry with `base × 2^attempt` delay |
//! | HTTP 502/503/504 | Retry with `base × 2^attempt` delay |
//! | Timeout / connection error / other status | Retry with flat delay |
//!
//! A URL whose attempts are exhausted is abandoned for this pass; for variant pages the
//! identifier is fetched again on the next crawl.

use crate::config::{Config, RetryConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Raw response from a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Failure to obtain any response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Performs one GET of a URL
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use osgenome::config::UserAgentConfig;
/// use osgenome::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "OSGenome".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Transport` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let body = if status.is_success() {
            response.text().await.map_err(classify_reqwest_error)?
        } else {
            String::new()
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

/// Kind of retryable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    RateLimited,
    ServerUnavailable,
    Network,
}

/// Retry and backoff rules shared by every crawl mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub flat_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (zero-based)
    pub fn delay_for(&self, class: FailureClass, attempt: u32) -> Duration {
        match class {
            FailureClass::RateLimited | FailureClass::ServerUnavailable => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
            FailureClass::Network => self.flat_delay,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            flat_delay: Duration::from_millis(config.flat_delay_ms),
        }
    }
}

/// Final outcome of fetching one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(String),
    NotFound,
    RateLimited,
    ServerUnavailable(u16),
    NetworkFailure(String),
}

/// Outcome plus the attempts and backoff delays it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub outcome: FetchOutcome,
    pub attempts: u32,
    pub delays: Vec<Duration>,
}

impl FetchReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success(_))
    }
}

/// Fetches URLs, retrying transient failures per `RetryPolicy`
#[derive(Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    timeout: Duration,
}

impl RetryingFetcher {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            transport,
            policy,
            timeout,
        }
    }

    /// Builds a fetcher over HTTP from the configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self::new(
            Arc::new(HttpTransport::new(config)?),
            RetryPolicy::from(&config.retry),
            config.crawler.request_timeout(),
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches one URL
    pub async fn fetch(&self, url: &str) -> FetchReport {
        let mut delays = Vec::new();
        let mut attempt = 0u32;

        loop {
            let result = tokio::time::timeout(self.timeout, self.transport.get(url, self.timeout))
                .await
                .unwrap_or(Err(TransportError::Timeout));

            let (outcome, failure) = classify(result);
            let Some(class) = failure else {
                if outcome == FetchOutcome::NotFound {
                    tracing::warn!("{} not found (404)", url);
                }
                return FetchReport {
                    outcome,
                    attempts: attempt + 1,
                    delays,
                };
            };

            if attempt + 1 >= self.policy.max_attempts {
                tracing::error!(
                    "Failed to fetch {} after {} attempts: {:?}",
                    url,
                    attempt + 1,
                    outcome
                );
                return FetchReport {
                    outcome,
                    attempts: attempt + 1,
                    delays,
                };
            }

            let delay = self.policy.delay_for(class, attempt);
            tracing::warn!(
                "{:?} for {} on attempt {}/{}, waiting {:?}",
                outcome,
                url,
                attempt + 1,
                self.policy.max_attempts,
                delay
            );
            tokio::time::sleep(delay).await;
            delays.push(delay);
            attempt += 1;
        }
    }
}

fn classify(
    result: Result<TransportResponse, TransportError>,
) -> (FetchOutcome, Option<FailureClass>) {
    let response = match result {
        Ok(response) => response,
        Err(e) => return (FetchOutcome::NetworkFailure(e.to_string()), Some(FailureClass::Network)),
    };

    match response.status {
        200..=299 => (FetchOutcome::Success(response.body), None),
        404 => (FetchOutcome::NotFound, None),
        429 => (FetchOutcome::RateLimited, Some(FailureClass::RateLimited)),
        502 | 503 | 504 => (
            FetchOutcome::ServerUnavailable(response.status),
            Some(FailureClass::ServerUnavailable),
        ),
        other => (
            FetchOutcome::NetworkFailure(format!("HTTP {}", other)),
            Some(FailureClass::Network),
        ),
    }
}
