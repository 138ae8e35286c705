//! Error types for reading source files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a source file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File uses an encoding other than UTF-8.
    #[error("unsupported encoding {encoding} in {path} (expected UTF-8)")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === CSV Parsing Errors ===
    /// File has no header row.
    #[error("source file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header row could not be parsed.
    #[error("failed to parse header of {path}: {message}")]
    Header { path: PathBuf, message: String },

    /// A single record could not be decoded. The reader continues past it.
    #[error("line {line} of {path}: {message}")]
    Record {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

impl IngestError {
    /// Whether the error concerns one record rather than the whole source.
    #[must_use]
    pub fn is_row_level(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Line number for record-level errors.
    #[must_use]
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::Record { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/artists.csv"),
        };
        assert_eq!(err.to_string(), "source file not found: /data/artists.csv");
    }

    #[test]
    fn test_row_level_classification() {
        let record = IngestError::Record {
            path: PathBuf::from("artists.csv"),
            line: 7,
            message: "invalid utf-8".to_string(),
        };
        assert!(record.is_row_level());
        assert_eq!(record.line(), Some(7));
        assert!(
            !IngestError::EmptyCsv {
                path: PathBuf::from("artists.csv")
            }
            .is_row_level()
        );
    }
}
