//! Record ingestion
//!
//! Completed records are handed to a [`RecordSink`]; the production sink
//! posts them to the ingestion service over HTTP.

mod fanout;
mod sink;

pub use fanout::submit_batch;
pub use sink::{HttpSink, RecordSink};
