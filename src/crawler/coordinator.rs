//! Harvest coordinator - top-level run orchestration
//!
//! This module wires the pieces of a run together:
//! - Compiling extraction rules and building the shared HTTP client
//! - Creating the list-page and detail-page limiters
//! - Driving the catalog window through the pagination driver
//! - Assembling the final run report

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::limiter::RequestLimiter;
use crate::crawler::page::CrawlContext;
use crate::crawler::pagination::{drive_pages, page_urls};
use crate::extract::ExtractRules;
use crate::ingest::{HttpSink, RecordSink};
use crate::output::RunReport;
use crate::HarvestError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main harvest coordinator
pub struct Harvester<S: RecordSink = HttpSink> {
    config: Arc<Config>,
    ctx: Arc<CrawlContext>,
    sink: S,
    list_limiter: RequestLimiter,
}

impl Harvester<HttpSink> {
    /// Creates a harvester that submits to the configured ingestion endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - Invalid selectors, endpoint, or HTTP client setup
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config)?;
        let sink = HttpSink::new(client.clone(), &config.ingest.endpoint)?;
        Self::build(config, client, sink)
    }
}

impl<S: RecordSink> Harvester<S> {
    /// Creates a harvester that hands records to `sink`
    pub fn with_sink(config: Config, sink: S) -> Result<Self, HarvestError> {
        let client = build_http_client(&config)?;
        Self::build(config, client, sink)
    }

    fn build(config: Config, client: reqwest::Client, sink: S) -> Result<Self, HarvestError> {
        let rules = ExtractRules::compile(&config.selectors)?;

        let ctx = CrawlContext {
            client,
            rules,
            detail_limiter: RequestLimiter::new(Duration::from_millis(
                config.crawler.detail_interval_ms,
            )),
            policy: config.crawler.failure_policy,
            cancel: CancellationToken::new(),
        };

        let list_limiter =
            RequestLimiter::new(Duration::from_millis(config.crawler.launch_interval_ms));

        Ok(Self {
            config: Arc::new(config),
            ctx: Arc::new(ctx),
            sink,
            list_limiter,
        })
    }

    /// Token that cancels the run when triggered
    ///
    /// Cancelling releases every in-flight fetch and submission promptly.
    pub fn cancel_token(&self) -> CancellationToken {
        self.ctx.cancel.clone()
    }

    /// List-page URLs this harvester will crawl
    pub fn page_urls(&self) -> Result<Vec<Url>, HarvestError> {
        page_urls(&self.config.catalog)
    }

    /// Runs the harvest over the whole catalog window
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - Every page task completed; failures isolated by
    ///   policy are listed in the report
    /// * `Err(HarvestError)` - Under the fail-fast policy, the first failure
    pub async fn run(&self) -> Result<RunReport, HarvestError> {
        let urls = self.page_urls()?;
        let started_at = Utc::now();

        tracing::info!(
            "Starting harvest of {} pages ({} items per page, policy {:?})",
            urls.len(),
            self.config.catalog.page_size,
            self.ctx.policy
        );

        let pages = drive_pages(
            Arc::clone(&self.ctx),
            self.sink.clone(),
            urls,
            &self.list_limiter,
        )
        .await?;

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            pages,
        };

        tracing::info!(
            "Harvest completed: {} pages, {} records submitted in {}s",
            report.pages_completed(),
            report.submissions_succeeded(),
            report.duration().num_seconds()
        );

        Ok(report)
    }
}

/// Runs a complete harvest against the configured ingestion endpoint
///
/// # Example
///
/// ```no_run
/// use shelf_harvest::config::load_config;
/// use shelf_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_harvest(config).await?;
/// println!("{} records submitted", report.submissions_succeeded());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<RunReport, HarvestError> {
    Harvester::new(config)?.run().await
}
