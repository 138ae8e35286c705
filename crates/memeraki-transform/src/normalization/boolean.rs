//! Yes/no normalization.

const TRUE_TOKENS: &[&str] = &["true", "1", "yes", "y", "on", "enabled", "active"];
const FALSE_TOKENS: &[&str] = &["false", "0", "no", "n", "off", "disabled", "inactive"];

/// Parses common spellings of a boolean, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if TRUE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(value)) {
        Some(true)
    } else if FALSE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(value)) {
        Some(false)
    } else {
        None
    }
}
