use chrono::NaiveDate;

/// Parses a `YYYY-MM-DD` calendar date and returns it in canonical form.
pub fn parse_iso_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}
