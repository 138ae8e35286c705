//! Per-row error types.
//!
//! Both `ValidationError` and `MappingError` are recoverable: the row is
//! skipped, reported and counted, and the run continues.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid document identifier: {reason}")]
    InvalidDocumentId { value: String, reason: IdRejection },
}

/// Why the store would refuse a document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdRejection {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier contains '/'")]
    ContainsSlash,
    #[error("'.' and '..' are not valid identifiers")]
    DotSegment,
    #[error("identifiers of the form __name__ are reserved")]
    Reserved,
    #[error("identifier is {bytes} bytes, more than the {max}-byte limit")]
    TooLong { bytes: usize, max: usize },
}

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Required field is empty or absent.
    Missing,
    NotInteger,
    NotFloat,
    NotBoolean,
    InvalidDate,
    NotAllowed { allowed: &'static [&'static str] },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("required value is missing"),
            Self::NotInteger => f.write_str("not a whole number"),
            Self::NotFloat => f.write_str("not a finite number"),
            Self::NotBoolean => f.write_str("not a yes/no value"),
            Self::InvalidDate => f.write_str("not a YYYY-MM-DD date"),
            Self::NotAllowed { allowed } => write!(f, "expected one of {}", allowed.join(", ")),
        }
    }
}

/// One offending field of a rejected row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
    /// The raw cell, if there was one. Not part of `Display` since rows may
    /// carry personal data.
    pub value: Option<String>,
}

impl FieldIssue {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: IssueKind::Missing,
            value: None,
        }
    }

    pub fn invalid(field: impl Into<String>, kind: IssueKind, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

/// A row rejected by the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub line: u64,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Names of the offending fields, in schema order.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A clean record that could not be turned into a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("line {line}: natural key field '{field}' is missing")]
    MissingNaturalKey { line: u64, field: String },

    #[error("line {line}: natural key {value:?} does not yield a usable document identifier: {reason}")]
    InvalidIdentifier {
        line: u64,
        value: String,
        reason: IdRejection,
    },
}

impl MappingError {
    pub fn line(&self) -> u64 {
        match self {
            Self::MissingNaturalKey { line, .. } | Self::InvalidIdentifier { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_issue() {
        let err = ValidationError {
            line: 4,
            issues: vec![
                FieldIssue::missing("name"),
                FieldIssue::invalid("years_of_practice", IssueKind::NotInteger, "ten"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "line 4: name: required value is missing; years_of_practice: not a whole number"
        );
        assert_eq!(err.fields(), vec!["name", "years_of_practice"]);
        assert!(err.has_field("name"));
    }

    #[test]
    fn display_does_not_leak_raw_values() {
        let issue = FieldIssue::invalid("is_active", IssueKind::NotBoolean, "+91 98765 43210");
        assert!(!issue.to_string().contains("98765"));
    }

    #[test]
    fn mapping_error_line() {
        let err = MappingError::InvalidIdentifier {
            line: 9,
            value: "__init__".to_string(),
            reason: IdRejection::Reserved,
        };
        assert_eq!(err.line(), 9);
        assert!(err.to_string().starts_with("line 9:"));
        assert!(err.to_string().ends_with("reserved"));
    }
}
