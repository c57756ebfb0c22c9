//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the shared HTTP client with the configured browser header
//! - GET requests for list and detail pages
//! - Error classification (timeout, transport, status)
//! - Prompt release of in-flight requests when the run is cancelled

use crate::config::Config;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Builds the HTTP client shared by every task of a run
///
/// The configured User-Agent is attached to every request made through the
/// client, including ingestion calls.
///
/// # Example
///
/// ```no_run
/// use shelf_harvest::config::load_config;
/// use shelf_harvest::crawler::build_http_client;
/// use std::path::Path;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header.as_str())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// # Request Flow
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | body text |
/// | other status | `HarvestError::Status` |
/// | timeout | `HarvestError::Timeout` |
/// | connection / body error | `HarvestError::Http` |
/// | run cancelled | `HarvestError::Cancelled` |
///
/// No retries are attempted.
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    cancel: &CancellationToken,
) -> Result<String, HarvestError> {
    let request = async {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_error(url.as_str(), e))
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(HarvestError::Cancelled { url: url.to_string() }),
        result = request => result,
    }
}

/// Maps a transport error to the crate error type
pub(crate) fn classify_error(url: &str, error: reqwest::Error) -> HarvestError {
    if error.is_timeout() {
        HarvestError::Timeout {
            url: url.to_string(),
        }
    } else {
        HarvestError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
