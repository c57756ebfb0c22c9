use crate::record::normalize::strip_whitespace;
use crate::record::Record;
use crate::{ExtractError, ExtractResult};

/// Fields read from one item fragment of a list page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFields {
    pub title: String,
    pub image_url: String,
    pub rating_score: String,
    pub rating_count: String,
    pub quote: String,
    /// Country marker such as `美` from a leading `[美]` on the author segment
    pub origin: Option<String>,
    pub author: String,
    pub translator: Option<String>,
    pub publisher: String,
    pub publish_year: String,
    pub price: f64,
    /// Link to the item's detail page, as found in the markup
    pub detail_href: String,
}

/// Fields read from an item's detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub identifier: Option<String>,
    pub description: String,
}

/// Accumulates one item's fields across the list and detail stages
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    listing: Option<ListingFields>,
    detail: Option<DetailFields>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the list-page stage output
    pub fn set_listing(&mut self, listing: ListingFields) -> &mut Self {
        self.listing = Some(listing);
        self
    }

    /// Stores the detail-page stage output
    pub fn set_detail(&mut self, detail: DetailFields) -> &mut Self {
        self.detail = Some(detail);
        self
    }

    /// Freezes the accumulated fields into a transmittable record
    ///
    /// Both stages must have run, and the title, author, publisher and
    /// publication year must be non-empty. Text fields are whitespace-stripped.
    pub fn build(&self) -> ExtractResult<Record> {
        let listing = self
            .listing
            .as_ref()
            .ok_or(ExtractError::Incomplete { missing: "listing" })?;
        let detail = self
            .detail
            .as_ref()
            .ok_or(ExtractError::Incomplete { missing: "detail" })?;

        let title = require(&listing.title, "title")?;
        let author = require(&listing.author, "author")?;
        let publisher = require(&listing.publisher, "publisher")?;
        require(&listing.publish_year, "publish year")?;

        let price = if listing.price.is_finite() {
            listing.price
        } else {
            0.0
        };

        Ok(Record {
            identifier: detail
                .identifier
                .as_deref()
                .map(strip_whitespace)
                .unwrap_or_default(),
            title,
            author,
            publisher,
            price,
            description: strip_whitespace(&detail.description),
            image_url: strip_whitespace(&listing.image_url),
        })
    }
}

/// Strips `value` and fails if nothing is left
fn require(value: &str, field: &'static str) -> ExtractResult<String> {
    let stripped = strip_whitespace(value);
    if stripped.is_empty() {
        Err(ExtractError::Incomplete { missing: field })
    } else {
        Ok(stripped)
    }
}
