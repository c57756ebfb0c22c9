//! Page crawler
//!
//! Fetches one list page, then walks its items in document order, fetching
//! each item's detail page and freezing the merged fields into a record.

use crate::config::FailurePolicy;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::limiter::RequestLimiter;
use crate::extract::{extract_detail, extract_list_page, ExtractRules};
use crate::output::ItemFailure;
use crate::record::{ListingFields, Record, RecordBuilder};
use crate::HarvestError;
use reqwest::Client;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Read-only state shared by every page task of a run
#[derive(Debug)]
pub struct CrawlContext {
    pub client: Client,
    pub rules: ExtractRules,
    pub detail_limiter: RequestLimiter,
    pub policy: FailurePolicy,
    pub cancel: CancellationToken,
}

/// Records built from one list page
#[derive(Debug, Default)]
pub struct PageBatch {
    /// Completed records, in document order
    pub records: Vec<Record>,
    /// Item fragments found on the page
    pub items_found: usize,
    /// Items skipped under the isolate policy
    pub item_failures: Vec<ItemFailure>,
}

/// Crawls one list page once its request slot opens
///
/// # Returns
///
/// * `Ok(PageBatch)` - The page was fetched; failed items are listed in the
///   batch under the isolate policy
/// * `Err(HarvestError)` - The list page could not be fetched, the run was
///   cancelled, or an item failed under the fail-fast policy
pub async fn crawl_page(
    ctx: &CrawlContext,
    page_url: &Url,
    slot: Instant,
) -> Result<PageBatch, HarvestError> {
    if !RequestLimiter::wait_for(slot, &ctx.cancel).await {
        return Err(HarvestError::Cancelled {
            url: page_url.to_string(),
        });
    }

    let body = fetch_page(&ctx.client, page_url, &ctx.cancel).await?;
    let listings = extract_list_page(&body, &ctx.rules);

    let mut batch = PageBatch {
        items_found: listings.len(),
        ..PageBatch::default()
    };

    for (position, listing) in listings.into_iter().enumerate() {
        let outcome = match listing {
            Ok(listing) => {
                let title = listing.title.clone();
                crawl_item(ctx, page_url, listing)
                    .await
                    .map_err(|e| (Some(title), e))
            }
            Err(source) => Err((
                None,
                HarvestError::Extract {
                    url: page_url.to_string(),
                    source,
                },
            )),
        };

        match outcome {
            Ok(record) => {
                tracing::debug!("Extracted '{}' from {}", record.title, page_url);
                batch.records.push(record);
            }
            Err((_, e)) if ctx.policy == FailurePolicy::FailFast || e.is_cancelled() => {
                return Err(e);
            }
            Err((title, e)) => {
                tracing::warn!("Skipping item {} on {}: {}", position, page_url, e);
                batch
                    .item_failures
                    .push(ItemFailure::new(position, title, &e));
            }
        }
    }

    Ok(batch)
}

/// Runs the detail stage for one listed item and freezes the record
async fn crawl_item(
    ctx: &CrawlContext,
    page_url: &Url,
    listing: ListingFields,
) -> Result<Record, HarvestError> {
    let detail_url = resolve_detail_url(page_url, &listing.detail_href)?;

    if !ctx.detail_limiter.acquire(&ctx.cancel).await {
        return Err(HarvestError::Cancelled {
            url: detail_url.to_string(),
        });
    }

    let body = fetch_page(&ctx.client, &detail_url, &ctx.cancel).await?;
    let detail = extract_detail(&body, &ctx.rules);
    if detail.identifier.is_none() {
        tracing::debug!("No identifier on {}", detail_url);
    }

    tracing::trace!(
        "Listing fields for '{}': rating={} votes={} translator={:?} origin={:?} quote={}",
        listing.title,
        listing.rating_score,
        listing.rating_count,
        listing.translator,
        listing.origin,
        listing.quote
    );

    let mut builder = RecordBuilder::new();
    builder.set_listing(listing).set_detail(detail);
    builder.build().map_err(|source| HarvestError::Extract {
        url: detail_url.to_string(),
        source,
    })
}

/// Resolves a detail link against the list page it was found on
fn resolve_detail_url(page_url: &Url, href: &str) -> Result<Url, HarvestError> {
    page_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .ok_or_else(|| HarvestError::Extract {
            url: page_url.to_string(),
            source: crate::ExtractError::InvalidLink {
                href: href.to_string(),
            },
        })
}
