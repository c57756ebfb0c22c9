//! Text normalization applied to record fields

/// Removes every space, tab, newline and carriage return from `value`
///
/// Applied to text fields when a record is frozen for transmission. The
/// operation is idempotent.
pub fn strip_whitespace(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect()
}

/// Removes straight double quotes, then strips whitespace
pub fn clean_title(value: &str) -> String {
    strip_whitespace(&value.replace('"', ""))
}
