//! Crawler module for catalog page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with cancellation
//! - Request spacing for list and detail pages
//! - Per-page crawling (list page, then each item's detail page)
//! - Pagination over the catalog window and overall run coordination

mod coordinator;
pub(crate) mod fetcher;
mod limiter;
mod page;
mod pagination;

pub use coordinator::{run_harvest, Harvester};
pub use fetcher::{build_http_client, fetch_page};
pub use limiter::RequestLimiter;
pub use page::{crawl_page, CrawlContext, PageBatch};
pub use pagination::{drive_pages, page_offsets, page_urls};
