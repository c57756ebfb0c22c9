//! Run statistics
//!
//! Summarises a [`RunReport`] and prints it to stdout.

use crate::output::report::{PageOutcome, RunReport};
use crate::ErrorKind;
use std::collections::HashMap;

/// Aggregated counts for one run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub pages_completed: usize,
    pub pages_failed: usize,
    pub items_found: usize,
    pub records_built: usize,
    pub submissions_succeeded: usize,
    pub submissions_failed: usize,
    /// Failures of every stage, grouped by kind
    pub failures_by_kind: HashMap<ErrorKind, usize>,
    pub duration_seconds: i64,
}

/// Computes statistics from a run report
pub fn summarize(report: &RunReport) -> RunStatistics {
    let mut failures_by_kind: HashMap<ErrorKind, usize> = HashMap::new();

    for page in &report.pages {
        if let PageOutcome::Failed { kind, .. } = page.outcome {
            *failures_by_kind.entry(kind).or_default() += 1;
        }
        for failure in &page.item_failures {
            *failures_by_kind.entry(failure.kind).or_default() += 1;
        }
        for failure in &page.submissions.failures {
            *failures_by_kind.entry(failure.kind).or_default() += 1;
        }
    }

    RunStatistics {
        pages_completed: report.pages_completed() - report.pages_failed(),
        pages_failed: report.pages_failed(),
        items_found: report.items_found(),
        records_built: report.records_built(),
        submissions_succeeded: report.submissions_succeeded(),
        submissions_failed: report.submissions_failed(),
        failures_by_kind,
        duration_seconds: report.duration().num_seconds(),
    }
}

/// Prints one completion line per page followed by the run totals
pub fn print_summary(report: &RunReport) {
    println!("=== Harvest Summary ===\n");

    for page in &report.pages {
        match &page.outcome {
            PageOutcome::Completed => println!(
                "  Page {} complete: {} records, {} submitted ({})",
                page.index, page.records_built, page.submissions.succeeded, page.url
            ),
            PageOutcome::Failed { message, .. } => {
                println!("  Page {} failed: {}", page.index, message)
            }
        }
        for failure in &page.item_failures {
            println!(
                "    - item {} ({}): {}",
                failure.position,
                failure.title.as_deref().unwrap_or("untitled"),
                failure.message
            );
        }
        for failure in &page.submissions.failures {
            println!("    - submission '{}': {}", failure.title, failure.message);
        }
    }
    println!();

    let stats = summarize(report);

    println!("Overview:");
    println!(
        "  Pages: {} completed, {} failed",
        stats.pages_completed, stats.pages_failed
    );
    println!("  Items found: {}", stats.items_found);
    println!("  Records built: {}", stats.records_built);
    println!(
        "  Submissions: {} succeeded, {} failed",
        stats.submissions_succeeded, stats.submissions_failed
    );
    println!("  Duration: {}s", stats.duration_seconds);

    if !stats.failures_by_kind.is_empty() {
        println!("\nFailures by Kind:");
        let mut counts: Vec<_> = stats.failures_by_kind.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in counts {
            println!("  {:?}: {}", kind, count);
        }
    }
}
