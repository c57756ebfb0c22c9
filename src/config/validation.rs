use crate::config::types::{CatalogConfig, Config, CrawlerConfig, IngestConfig, UserAgentConfig};
use crate::extract::ExtractRules;
use crate::ConfigError;
use url::Url;

/// Largest catalog window accepted; every page becomes one concurrent task
const MAX_PAGE_COUNT: u32 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_ingest_config(&config.ingest)?;
    ExtractRules::compile(&config.selectors)?;
    Ok(())
}

/// Validates the catalog window
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    validate_http_url("list-url", &config.list_url)?;

    if config.offset_param.trim().is_empty() {
        return Err(ConfigError::Validation(
            "offset-param cannot be empty".to_string(),
        ));
    }

    if config.page_count < 1 || config.page_count > MAX_PAGE_COUNT {
        return Err(ConfigError::Validation(format!(
            "page-count must be between 1 and {}, got {}",
            MAX_PAGE_COUNT, config.page_count
        )));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page-size must be >= 1, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the shared request header
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent header cannot be empty".to_string(),
        ));
    }

    if reqwest::header::HeaderValue::from_str(&config.header).is_err() {
        return Err(ConfigError::Validation(format!(
            "user-agent header '{}' is not a valid header value",
            config.header
        )));
    }

    Ok(())
}

/// Validates the ingestion endpoint
fn validate_ingest_config(config: &IngestConfig) -> Result<(), ConfigError> {
    validate_http_url("ingest endpoint", &config.endpoint)
}

/// Checks that a URL parses and uses an HTTP(S) scheme
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use HTTP or HTTPS",
            name, value
        )));
    }

    Ok(())
}
