//! Pagination driver
//!
//! Computes the list-page URLs of the catalog window and runs one task per
//! page. Every task is spawned up front; a shared [`RequestLimiter`] spaces
//! the list-page requests themselves. The driver then drains the `JoinSet`
//! until all N page tasks have signalled completion.
//!
//! Parallelism is exactly the page count for the crawl phase, and each page
//! task fans out one submission per record. Both ceilings follow the catalog
//! window size; there is no global worker cap.

use crate::config::{CatalogConfig, FailurePolicy};
use crate::crawler::limiter::RequestLimiter;
use crate::crawler::page::{crawl_page, CrawlContext};
use crate::ingest::{submit_batch, RecordSink};
use crate::output::{PageOutcome, PageReport};
use crate::HarvestError;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Item offsets of the pages in the catalog window
///
/// For 10 pages of 25 items this is `0, 25, 50, ..., 225`.
pub fn page_offsets(page_count: u32, page_size: u32) -> Vec<u64> {
    (0..u64::from(page_count))
        .map(|index| index * u64::from(page_size))
        .collect()
}

/// Builds the list-page URLs of the catalog window, in page order
pub fn page_urls(catalog: &CatalogConfig) -> Result<Vec<Url>, HarvestError> {
    let base = Url::parse(&catalog.list_url)?;

    Ok(page_offsets(catalog.page_count, catalog.page_size)
        .into_iter()
        .map(|offset| {
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair(&catalog.offset_param, &offset.to_string());
            url
        })
        .collect())
}

/// Crawls and submits every page, returning one report per page
///
/// Each page's submissions finish before that page's task completes, so once
/// this returns every record of the window has been submitted (or has
/// failed). Under the fail-fast policy the first failure cancels the run and
/// is returned after all tasks have drained.
pub async fn drive_pages<S: RecordSink>(
    ctx: Arc<CrawlContext>,
    sink: S,
    urls: Vec<Url>,
    list_limiter: &RequestLimiter,
) -> Result<Vec<PageReport>, HarvestError> {
    let expected = urls.len();
    let mut tasks = JoinSet::new();

    for (index, url) in urls.into_iter().enumerate() {
        // Reserved in page order, so requests go out in page order
        let slot = list_limiter.reserve();
        let ctx = Arc::clone(&ctx);
        let sink = sink.clone();

        tasks.spawn(async move {
            let result = run_page(&ctx, &sink, index, &url, slot).await;
            (index, url, result)
        });
    }

    let mut reports = Vec::with_capacity(expected);
    let mut completed = 0;
    let mut first_error: Option<HarvestError> = None;

    while let Some(joined) = tasks.join_next().await {
        completed += 1;

        let (index, url, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                ctx.cancel.cancel();
                first_error.get_or_insert(HarvestError::Join(e));
                continue;
            }
        };

        match result {
            Ok(report) => {
                tracing::info!(
                    "Page {} complete ({}/{}): {} records built, {} submitted, {} item failures",
                    index,
                    completed,
                    expected,
                    report.records_built,
                    report.submissions.succeeded,
                    report.item_failures.len() + report.submissions.failures.len()
                );
                reports.push(report);
            }
            Err(e) if ctx.policy == FailurePolicy::FailFast => {
                if e.is_cancelled() {
                    tracing::debug!("Page {} abandoned: {}", index, e);
                } else {
                    tracing::error!("Page {} failed: {}", index, e);
                }
                ctx.cancel.cancel();
                let replace = match &first_error {
                    Some(existing) => existing.is_cancelled() && !e.is_cancelled(),
                    None => true,
                };
                if replace {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                tracing::warn!("Page {} failed ({}/{}): {}", index, completed, expected, e);
                reports.push(PageReport::failed(index, url.as_str(), &e));
            }
        }
    }

    tracing::debug!("All {} page tasks signalled completion", completed);

    if let Some(e) = first_error {
        return Err(e);
    }

    reports.sort_by_key(|report| report.index);
    Ok(reports)
}

/// Crawls one page and submits its batch
async fn run_page<S: RecordSink>(
    ctx: &CrawlContext,
    sink: &S,
    index: usize,
    url: &Url,
    slot: tokio::time::Instant,
) -> Result<PageReport, HarvestError> {
    tracing::info!("Starting page {}: {}", index, url);

    let batch = crawl_page(ctx, url, slot).await?;
    let records_built = batch.records.len();
    let submissions = submit_batch(sink, batch.records, ctx.policy, &ctx.cancel).await?;

    Ok(PageReport {
        index,
        url: url.to_string(),
        outcome: PageOutcome::Completed,
        items_found: batch.items_found,
        records_built,
        item_failures: batch.item_failures,
        submissions,
    })
}
