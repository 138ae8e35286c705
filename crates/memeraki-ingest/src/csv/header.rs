//! CSV header normalization.

use csv::StringRecord;

/// Normalizes a header value: strips a UTF-8 BOM and surrounding whitespace.
pub fn normalize_header(value: &str) -> String {
    value.trim_matches('\u{feff}').trim().to_string()
}

/// Normalizes every column of a header record.
pub fn normalize_headers(record: &StringRecord) -> Vec<String> {
    record.iter().map(normalize_header).collect()
}
