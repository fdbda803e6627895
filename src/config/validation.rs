use crate::config::types::{
    CacheConfig, CatalogueConfig, ClassifierConfig, Config, CrawlerConfig, DataConfig,
    RetryConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_cache_config(&config.cache)?;
    validate_classifier_config(&config.classifier)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_data_config(&config.data)?;
    validate_catalogue_config(config)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(
            "checkpoint_interval must be >= 1".to_string(),
        ));
    }

    if config.concurrency_floor < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency_floor must be >= 1, got {}",
            config.concurrency_floor
        )));
    }

    if config.concurrency_floor > config.concurrency_ceiling {
        return Err(ConfigError::Validation(format!(
            "concurrency_floor ({}) cannot exceed concurrency_ceiling ({})",
            config.concurrency_floor, config.concurrency_ceiling
        )));
    }

    if !config.concurrency_factor.is_finite() || config.concurrency_factor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "concurrency_factor must be a non-negative number, got {}",
            config.concurrency_factor
        )));
    }

    if config.request_delay_ms < 500 {
        tracing::warn!(
            "request_delay_ms is {}ms; delays under 500ms tend to trigger rate limiting",
            config.request_delay_ms
        );
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    // 2^attempt must not overflow the backoff computation
    if config.max_attempts > 16 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be <= 16, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.max_entries < 1 {
        return Err(ConfigError::Validation(
            "cache max_entries must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.common_phrases.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "common_phrases cannot contain empty phrases".to_string(),
        ));
    }

    if config.exclusion_markers.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "exclusion_markers cannot contain empty markers".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates data file configuration
fn validate_data_config(config: &DataConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("personal_file", &config.personal_file),
        ("reference_file", &config.reference_file),
        ("results_file", &config.results_file),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }

        if value.contains('/') || value.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "{} must be a bare file name, got '{}'",
                name, value
            )));
        }
    }

    if config.reference_file == config.results_file {
        return Err(ConfigError::Validation(
            "reference_file and results_file must differ".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalogue_config(config: &Config) -> Result<(), ConfigError> {
    let catalogue: &CatalogueConfig = &config.catalogue;

    let url = config
        .catalogue_url()
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid catalogue api-url: {}", e)))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "catalogue api-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if !(1..=500).contains(&catalogue.page_limit) {
        return Err(ConfigError::Validation(format!(
            "catalogue page-limit must be between 1 and 500, got {}",
            catalogue.page_limit
        )));
    }

    if catalogue.file.is_empty() || catalogue.file.contains('/') || catalogue.file.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "catalogue file must be a bare file name, got '{}'",
            catalogue.file
        )));
    }

    let data = &config.data;
    if [&data.personal_file, &data.reference_file, &data.results_file].contains(&&catalogue.file) {
        return Err(ConfigError::Validation(
            "catalogue file must differ from the data files".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
