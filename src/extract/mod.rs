//! Field extraction for list pages and detail pages
//!
//! Extraction is synchronous and works on already-fetched markup, so parsed
//! documents never live across an await point.

mod detail;
mod info_line;
mod list_item;
mod selectors;

pub use detail::{extract_detail, parse_identifier};
pub use info_line::{parse_info_line, parse_price, InfoLine};
pub use list_item::{extract_list_page, extract_listing};
pub use selectors::ExtractRules;
