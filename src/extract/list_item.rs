use crate::extract::info_line::parse_info_line;
use crate::extract::selectors::ExtractRules;
use crate::record::{clean_title, ListingFields};
use crate::{ExtractError, ExtractResult};
use scraper::{ElementRef, Html};

/// Extracts every listed item from a list page, in document order
///
/// Each item is extracted independently, so one malformed item does not
/// prevent the others from being read.
pub fn extract_list_page(html: &str, rules: &ExtractRules) -> Vec<ExtractResult<ListingFields>> {
    let document = Html::parse_document(html);
    document
        .select(&rules.item)
        .map(|item| extract_listing(item, rules))
        .collect()
}

/// Extracts the list-page fields of one item fragment
///
/// The title link and the metadata line are required; image, rating, vote
/// count and quote fall back to empty strings.
pub fn extract_listing(item: ElementRef<'_>, rules: &ExtractRules) -> ExtractResult<ListingFields> {
    let title_node = item
        .select(&rules.title)
        .next()
        .ok_or(ExtractError::MissingNode { field: "title" })?;
    let title = clean_title(&node_text(title_node));

    let detail_href = title_node
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(ExtractError::MissingNode {
            field: "detail link",
        })?
        .to_string();

    let image_url = item
        .select(&rules.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap_or_default()
        .to_string();

    let rating_score = first_text(item, &rules.rating).unwrap_or_default();

    let rating_count = first_text(item, &rules.votes)
        .and_then(|text| {
            rules
                .digits
                .find(text.trim())
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_default();

    let quote = first_text(item, &rules.quote)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    let info_text = first_text(item, &rules.info_line)
        .ok_or(ExtractError::MissingNode { field: "info line" })?;
    let info = parse_info_line(&info_text, &rules.number)?;

    Ok(ListingFields {
        title,
        image_url,
        rating_score,
        rating_count,
        quote,
        origin: info.origin,
        author: info.author,
        translator: info.translator,
        publisher: info.publisher,
        publish_year: info.publish_year,
        price: info.price,
        detail_href,
    })
}

/// Concatenated text of the first node matching `selector`
fn first_text(item: ElementRef<'_>, selector: &scraper::Selector) -> Option<String> {
    item.select(selector).next().map(node_text)
}

fn node_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
