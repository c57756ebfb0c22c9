//! Output module for run reports and summaries
//!
//! This module handles:
//! - Recording per-page, per-item and per-record outcomes of a run
//! - Aggregating run statistics
//! - Printing the console summary

mod report;
pub mod stats;

pub use report::{
    ItemFailure, PageOutcome, PageReport, RecordFailure, RunReport, SubmissionReport,
};
pub use stats::{print_summary, summarize, RunStatistics};
