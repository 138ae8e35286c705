//! Numeric normalization utilities.

/// Parses a string as i64, returning None for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<i64>().ok()
}

/// Parses a string as a finite f64, returning None for invalid, empty, NaN
/// or infinite values.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_i64(" 42 "), Some(42));
        assert_eq!(parse_i64("-3"), Some(-3));
        assert_eq!(parse_i64("4.5"), None);
        assert_eq!(parse_i64("ten"), None);
        assert_eq!(parse_i64(""), None);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_f64("1250.50"), Some(1250.5));
        assert_eq!(parse_f64("7"), Some(7.0));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("1,000"), None);
    }
}
