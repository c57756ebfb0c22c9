use crate::crawler::fetcher::classify_error;
use crate::record::Record;
use crate::HarvestError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::future::Future;
use url::Url;

/// Destination for completed records
pub trait RecordSink: Send + Sync + Clone + 'static {
    /// Submits one record and returns the acknowledgement body
    fn submit(&self, record: &Record) -> impl Future<Output = Result<String, HarvestError>> + Send;
}

/// Posts each record as JSON to the ingestion endpoint
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: Url,
}

impl HttpSink {
    /// Creates a sink that shares the crawler's HTTP client
    pub fn new(client: Client, endpoint: &str) -> Result<Self, HarvestError> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }
}

impl RecordSink for HttpSink {
    async fn submit(&self, record: &Record) -> Result<String, HarvestError> {
        let body = serde_json::to_vec(record)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| classify_error(self.endpoint.as_str(), e))?;

        let status = response.status();
        let acknowledgement = response
            .text()
            .await
            .map_err(|e| classify_error(self.endpoint.as_str(), e))?;

        if status.is_client_error() {
            return Err(HarvestError::Rejected {
                title: record.title.clone(),
                status: status.as_u16(),
                reason: acknowledgement.trim().to_string(),
            });
        }
        if !status.is_success() {
            return Err(HarvestError::Ingest {
                title: record.title.clone(),
                reason: format!("HTTP {}: {}", status.as_u16(), acknowledgement.trim()),
            });
        }

        Ok(acknowledgement)
    }
}
