use super::text::clean_text;

/// Separator between items of a list cell.
pub const LIST_SEPARATOR: char = '|';

/// Splits a pipe-separated cell into cleaned, non-empty items.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(clean_text)
        .filter(|item| !item.is_empty())
        .collect()
}
