//! Grammar for the slash-delimited metadata line of a listed item
//!
//! The line has one of three shapes, told apart only by segment count:
//!
//! | Segments | Layout |
//! |----------|--------|
//! | 5 | author / translator / publisher / year / price |
//! | 4 | author / publisher / year / price |
//! | 3 | publisher / year / price (segment 0 doubles as author) |
//!
//! Every other count is rejected, as is a line with an empty segment
//! (a doubled or trailing slash), since it would shift fields out of place.

use crate::{ExtractError, ExtractResult};
use regex::Regex;

/// Marker appended to author names
const AUTHOR_MARKER: char = '著';

/// Parsed metadata line
#[derive(Debug, Clone, PartialEq)]
pub struct InfoLine {
    pub origin: Option<String>,
    pub author: String,
    pub translator: Option<String>,
    pub publisher: String,
    pub publish_year: String,
    pub price: f64,
}

/// Parses a metadata line such as `张三 著/重要文学出版社/2020/45.00元`
///
/// # Arguments
///
/// * `line` - The raw metadata line
/// * `number` - Decimal-number pattern used to pull the price out of the last segment
///
/// # Returns
///
/// * `Ok(InfoLine)` - The line had 3, 4 or 5 segments
/// * `Err(ExtractError::InfoLine)` - Any other segment count
/// * `Err(ExtractError::EmptySegment)` - A segment was blank after trimming
pub fn parse_info_line(line: &str, number: &Regex) -> ExtractResult<InfoLine> {
    let line = line.trim();
    let segments: Vec<&str> = line.split('/').map(str::trim).collect();

    if let Some(position) = segments.iter().position(|segment| segment.is_empty()) {
        return Err(ExtractError::EmptySegment {
            line: line.to_string(),
            position,
        });
    }

    let (author, translator, publisher, year, price) = match segments.as_slice() {
        [author, translator, publisher, year, price] => {
            (*author, Some(*translator), *publisher, *year, *price)
        }
        [author, publisher, year, price] => (*author, None, *publisher, *year, *price),
        [first, year, price] => (*first, None, *first, *year, *price),
        _ => {
            return Err(ExtractError::InfoLine {
                line: line.to_string(),
                segments: segments.len(),
            })
        }
    };

    Ok(InfoLine {
        origin: parse_origin(author),
        author: strip_author_marker(author),
        translator: translator.map(str::to_string),
        publisher: publisher.to_string(),
        publish_year: year.to_string(),
        price: parse_price(price, number),
    })
}

/// Extracts the first decimal number in `segment`; 0 when there is none
pub fn parse_price(segment: &str, number: &Regex) -> f64 {
    number
        .find(segment)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}

/// Removes a trailing author marker and the whitespace before it
fn strip_author_marker(segment: &str) -> String {
    let segment = segment.trim_end();
    segment
        .strip_suffix(AUTHOR_MARKER)
        .map(str::trim_end)
        .unwrap_or(segment)
        .to_string()
}

/// Reads a leading `[country]` bracket, e.g. `美` from `[美] 卡勒德·胡赛尼`
fn parse_origin(segment: &str) -> Option<String> {
    let rest = segment.trim_start().strip_prefix('[')?;
    let (origin, _) = rest.split_once(']')?;
    let origin = origin.trim();
    (!origin.is_empty()).then(|| origin.to_string())
}
