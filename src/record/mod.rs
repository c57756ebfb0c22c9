//! Catalog records
//!
//! A [`RecordBuilder`] is created per listed item, filled by the list-page and
//! detail-page stages, and frozen into an immutable [`Record`] right before
//! submission.

mod builder;
mod normalize;

pub use builder::{DetailFields, ListingFields, RecordBuilder};
pub use normalize::{clean_title, strip_whitespace};

use serde::Serialize;

/// A completed catalog record in its transmission form
///
/// Serialized as the flat JSON object the ingestion service expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "ISBN")]
    pub identifier: String,

    #[serde(rename = "name")]
    pub title: String,

    pub author: String,

    #[serde(rename = "publishHouse")]
    pub publisher: String,

    pub price: f64,

    #[serde(rename = "described")]
    pub description: String,

    #[serde(rename = "imgUrl")]
    pub image_url: String,
}
