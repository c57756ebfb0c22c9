use crate::config::SelectorConfig;
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;

/// "One or more digits", used for vote counts
const DIGITS_PATTERN: &str = r"\d+";

/// Decimal number with optional sign, fraction and exponent, used for prices
const NUMBER_PATTERN: &str = r"[+\-]?(?:(?:0|[1-9]\d*)(?:\.\d*)?|\.\d+)(?:[eE][+\-]?\d+)?";

/// Compiled selectors and patterns for both page layouts
///
/// Built once per run and shared read-only by every page task.
#[derive(Debug, Clone)]
pub struct ExtractRules {
    pub item: Selector,
    pub title: Selector,
    pub image: Selector,
    pub rating: Selector,
    pub votes: Selector,
    pub quote: Selector,
    pub info_line: Selector,
    pub detail_info: Selector,
    pub related_info: Selector,
    pub digits: Regex,
    pub number: Regex,
}

impl ExtractRules {
    /// Compiles every selector in `config`
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractRules)` - All selectors and patterns compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector could not be parsed
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item: parse_selector(&config.item)?,
            title: parse_selector(&config.title)?,
            image: parse_selector(&config.image)?,
            rating: parse_selector(&config.rating)?,
            votes: parse_selector(&config.votes)?,
            quote: parse_selector(&config.quote)?,
            info_line: parse_selector(&config.info_line)?,
            detail_info: parse_selector(&config.detail_info)?,
            related_info: parse_selector(&config.related_info)?,
            digits: Regex::new(DIGITS_PATTERN)?,
            number: Regex::new(NUMBER_PATTERN)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
