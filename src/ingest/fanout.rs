//! Submission fan-out
//!
//! One task per record, joined through a `JoinSet` that is drained until every
//! launched submission has signalled completion.

use crate::config::FailurePolicy;
use crate::ingest::sink::RecordSink;
use crate::output::{RecordFailure, SubmissionReport};
use crate::record::Record;
use crate::HarvestError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Submits a batch of records concurrently and waits for all of them
///
/// Under [`FailurePolicy::Isolate`] failed submissions are recorded in the
/// returned report and the rest of the batch is unaffected. Under
/// [`FailurePolicy::FailFast`] the first failure cancels the run, the
/// remaining tasks are still drained, and that failure is returned.
///
/// Records already accepted by the service stay accepted either way.
pub async fn submit_batch<S: RecordSink>(
    sink: &S,
    records: Vec<Record>,
    policy: FailurePolicy,
    cancel: &CancellationToken,
) -> Result<SubmissionReport, HarvestError> {
    let mut report = SubmissionReport {
        attempted: records.len(),
        ..SubmissionReport::default()
    };
    let mut tasks = JoinSet::new();

    for record in records {
        let sink = sink.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            tracing::debug!(
                "Submitting record: ISBN={} name={} author={} publishHouse={} price={:.2}",
                record.identifier,
                record.title,
                record.author,
                record.publisher,
                record.price
            );
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(HarvestError::Cancelled {
                    url: format!("ingest of '{}'", record.title),
                }),
                result = sink.submit(&record) => result,
            };
            (record.title, result)
        });
    }

    let mut first_error: Option<HarvestError> = None;

    while let Some(joined) = tasks.join_next().await {
        report.completed += 1;

        let (title, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                cancel.cancel();
                first_error.get_or_insert(HarvestError::Join(e));
                continue;
            }
        };

        match result {
            Ok(acknowledgement) => {
                report.succeeded += 1;
                tracing::debug!(
                    "Ingest acknowledged '{}': {}",
                    title,
                    acknowledgement.trim()
                );
            }
            Err(e) if policy == FailurePolicy::FailFast => {
                if e.is_cancelled() {
                    tracing::debug!("Submission of '{}' abandoned: {}", title, e);
                } else {
                    tracing::error!("Submission of '{}' failed: {}", title, e);
                }
                cancel.cancel();
                report.failures.push(RecordFailure {
                    title,
                    kind: e.kind(),
                    message: e.to_string(),
                });
                // A real failure outranks the cancellations it caused
                let replace = match &first_error {
                    Some(existing) => existing.is_cancelled() && !e.is_cancelled(),
                    None => true,
                };
                if replace {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                tracing::warn!("Submission of '{}' failed: {}", title, e);
                report.failures.push(RecordFailure {
                    title,
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(report),
    }
}
