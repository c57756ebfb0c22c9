use serde::Deserialize;

/// Main configuration structure for Shelf-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub ingest: IngestConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// The catalog window to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// URL of the first list page, without the offset parameter
    #[serde(rename = "list-url")]
    pub list_url: String,

    /// Query parameter carrying the item offset of a list page
    #[serde(rename = "offset-param", default = "default_offset_param")]
    pub offset_param: String,

    /// Number of list pages to crawl
    #[serde(rename = "page-count")]
    pub page_count: u32,

    /// Number of items listed per page
    #[serde(rename = "page-size")]
    pub page_size: u32,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between two list-page requests (milliseconds)
    #[serde(rename = "launch-interval-ms")]
    pub launch_interval_ms: u64,

    /// Minimum time between two detail-page requests (milliseconds, 0 disables)
    #[serde(rename = "detail-interval-ms", default)]
    pub detail_interval_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// What to do when an item, page or submission fails
    #[serde(rename = "failure-policy", default)]
    pub failure_policy: FailurePolicy,
}

/// How failures inside a run are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure in the run report and keep going
    #[default]
    Isolate,
    /// Cancel the whole run on the first failure
    FailFast,
}

/// Browser identification attached to every outbound request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// The User-Agent header value
    pub header: String,
}

/// Downstream ingestion service
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Endpoint receiving one JSON record per request
    pub endpoint: String,
}

/// CSS selectors describing the list-page and detail-page layouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One node per listed item
    pub item: String,
    /// Title link within an item; its href points at the detail page
    pub title: String,
    pub image: String,
    pub rating: String,
    /// Node holding the vote count embedded in surrounding text
    pub votes: String,
    pub quote: String,
    /// Slash-delimited author/publisher/year/price line
    #[serde(rename = "info-line")]
    pub info_line: String,
    /// Detail-page block holding the identifier
    #[serde(rename = "detail-info")]
    pub detail_info: String,
    /// Detail-page paragraphs, the first of which is the description
    #[serde(rename = "related-info")]
    pub related_info: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: "table".to_string(),
            title: "div.pl2 a".to_string(),
            image: "img".to_string(),
            rating: "div.star span.rating_nums".to_string(),
            votes: "div.star span.pl".to_string(),
            quote: "p.quote span".to_string(),
            info_line: "p.pl".to_string(),
            detail_info: "div#info".to_string(),
            related_info: "div.related_info p".to_string(),
        }
    }
}

fn default_offset_param() -> String {
    "start".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
