//! Run report types
//!
//! Every page, item and submission outcome of a run is recorded here so the
//! caller can decide what a partial success means.

use crate::{ErrorKind, HarvestError};
use chrono::{DateTime, Utc};

/// A listed item that could not be turned into a record
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// Position of the item on its page, in document order
    pub position: usize,
    /// The item's title, when it could be read
    pub title: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
}

impl ItemFailure {
    pub fn new(position: usize, title: Option<String>, error: &HarvestError) -> Self {
        Self {
            position,
            title,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// A record the ingestion service did not accept
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub title: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one submission batch
#[derive(Debug, Clone, Default)]
pub struct SubmissionReport {
    /// Submissions launched
    pub attempted: usize,
    /// Submission tasks that signalled completion, successful or not
    pub completed: usize,
    pub succeeded: usize,
    pub failures: Vec<RecordFailure>,
}

/// Final state of one list page
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// The page was crawled and its batch submitted
    Completed,
    /// The list page itself could not be crawled
    Failed { kind: ErrorKind, message: String },
}

/// Outcome of one list page
#[derive(Debug, Clone)]
pub struct PageReport {
    pub index: usize,
    pub url: String,
    pub outcome: PageOutcome,
    /// Item fragments found on the page
    pub items_found: usize,
    /// Records built from both stages
    pub records_built: usize,
    pub item_failures: Vec<ItemFailure>,
    pub submissions: SubmissionReport,
}

impl PageReport {
    /// Report for a page whose list fetch failed
    pub fn failed(index: usize, url: &str, error: &HarvestError) -> Self {
        Self {
            index,
            url: url.to_string(),
            outcome: PageOutcome::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
            items_found: 0,
            records_built: 0,
            item_failures: Vec::new(),
            submissions: SubmissionReport::default(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, PageOutcome::Completed)
    }
}

/// Everything that happened during one run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per page, ordered by page index
    pub pages: Vec<PageReport>,
}

impl RunReport {
    /// Number of page tasks that signalled completion
    pub fn pages_completed(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_failed(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_completed()).count()
    }

    pub fn items_found(&self) -> usize {
        self.pages.iter().map(|p| p.items_found).sum()
    }

    pub fn records_built(&self) -> usize {
        self.pages.iter().map(|p| p.records_built).sum()
    }

    pub fn item_failures(&self) -> usize {
        self.pages.iter().map(|p| p.item_failures.len()).sum()
    }

    /// Number of submission tasks that signalled completion
    pub fn submissions_completed(&self) -> usize {
        self.pages.iter().map(|p| p.submissions.completed).sum()
    }

    pub fn submissions_succeeded(&self) -> usize {
        self.pages.iter().map(|p| p.submissions.succeeded).sum()
    }

    pub fn submissions_failed(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.submissions.failures.len())
            .sum()
    }

    /// True when every page, item and submission succeeded
    pub fn is_clean(&self) -> bool {
        self.pages_failed() == 0 && self.item_failures() == 0 && self.submissions_failed() == 0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
