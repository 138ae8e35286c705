//! Free-text normalization.

/// Whether a raw cell counts as "no value": empty after trimming, or the
/// literal `null` in any case.
pub fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

/// Strips control characters (newline and tab survive) and trims.
pub fn clean_text(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    stripped.trim().to_string()
}

/// Matches `value` against an allowed set, ignoring case, and returns the
/// canonical spelling.
pub fn match_allowed(value: &str, allowed: &'static [&'static str]) -> Option<&'static str> {
    let value = value.trim();
    allowed
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(value))
}
