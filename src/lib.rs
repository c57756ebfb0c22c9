//! Shelf-Harvest: a catalog crawler that feeds an ingestion service
//!
//! This crate walks a paginated catalog listing, extracts one record per listed
//! item from the list page and the item's detail page, and submits every
//! completed record to a downstream ingestion endpoint.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod ingest;
pub mod output;
pub mod record;

use thiserror::Error;

/// Main error type for Shelf-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} cancelled")]
    Cancelled { url: String },

    #[error("Extraction failed for {url}: {source}")]
    Extract { url: String, source: ExtractError },

    #[error("Ingestion rejected record '{title}': {reason}")]
    Ingest { title: String, reason: String },

    #[error("Ingestion refused record '{title}' with HTTP {status}: {reason}")]
    Rejected {
        title: String,
        status: u16,
        reason: String,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Task failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Coarse classification used to decide how a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network trouble, timeouts, non-success statuses
    Transient,
    /// The remote markup did not have the expected shape
    Structural,
    /// Misconfiguration, a refused request, or a broken local invariant
    Terminal,
    /// Work abandoned because the run was cancelled
    Cancelled,
}

impl HarvestError {
    /// Classifies this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarvestError::Http { .. }
            | HarvestError::Timeout { .. }
            | HarvestError::Status { .. }
            | HarvestError::Ingest { .. } => ErrorKind::Transient,
            HarvestError::Extract { .. } => ErrorKind::Structural,
            HarvestError::Cancelled { .. } => ErrorKind::Cancelled,
            HarvestError::Config(_)
            | HarvestError::Rejected { .. }
            | HarvestError::Client(_)
            | HarvestError::UrlParse(_)
            | HarvestError::Serialize(_)
            | HarvestError::Join(_) => ErrorKind::Terminal,
        }
    }

    /// Returns true if this error only reflects a cancelled run
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Markup-shape errors raised while extracting record fields
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("Missing {field} node")]
    MissingNode { field: &'static str },

    #[error("Info line '{line}' has {segments} segments, expected 3 to 5")]
    InfoLine { line: String, segments: usize },

    #[error("Info line '{line}' has an empty segment at position {position}")]
    EmptySegment { line: String, position: usize },

    #[error("Record is incomplete: missing {missing}")]
    Incomplete { missing: &'static str },

    #[error("Cannot resolve detail link '{href}'")]
    InvalidLink { href: String },
}

/// Result type alias for Shelf-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::{Config, FailurePolicy};
pub use crawler::{run_harvest, Harvester};
pub use output::RunReport;
pub use record::{Record, RecordBuilder};
