use crate::extract::selectors::ExtractRules;
use crate::record::DetailFields;
use scraper::Html;

/// Identifier markers, tried in order
const IDENTIFIER_MARKERS: [&str; 4] = ["ISBN:", "ISBN：", "统一书号:", "统一书号："];

/// Extracts the detail-page fields from a parsed detail page
///
/// A page without an info block, or whose info block carries no identifier
/// marker, yields no identifier. A missing related-info paragraph yields an
/// empty description.
pub fn extract_detail(html: &str, rules: &ExtractRules) -> DetailFields {
    let document = Html::parse_document(html);

    let identifier = document
        .select(&rules.detail_info)
        .next()
        .map(|info| info.text().collect::<String>())
        .and_then(|text| parse_identifier(&text));

    let description = document
        .select(&rules.related_info)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    DetailFields {
        identifier,
        description,
    }
}

/// Reads the identifier following the first recognised marker in `info_text`
///
/// The identifier is the first line of the trimmed remainder after the marker.
pub fn parse_identifier(info_text: &str) -> Option<String> {
    IDENTIFIER_MARKERS.iter().find_map(|marker| {
        let (_, rest) = info_text.split_once(marker)?;
        let value = rest.trim().lines().next()?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
