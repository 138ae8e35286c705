//! Error types for the document store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by credential loading and store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credential file does not exist.
    #[error("credential file not found: {path}")]
    CredentialNotFound { path: PathBuf },

    /// Credential file exists but could not be read.
    #[error("failed to read credential file {path}: {source}")]
    CredentialRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credential file is not valid JSON or lacks required keys.
    #[error("invalid credential file {path}: {message}")]
    CredentialInvalid { path: PathBuf, message: String },

    /// No bearer token in the credential file or the environment.
    #[error("no access token in {path}; set `access_token` or {env}")]
    MissingToken { path: PathBuf, env: &'static str },

    /// The store refused the credential.
    #[error("credential rejected by store (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Too many requests.
    #[error("store rate limit exceeded")]
    RateLimited {
        /// Server-suggested wait, if any.
        retry_after_secs: Option<u64>,
    },

    /// Store returned a server-side error.
    #[error("store unavailable (HTTP {status}): {message}")]
    Unavailable { status: u16, message: String },

    /// Request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// Store refused the write itself (bad document, precondition, ...).
    #[error("write rejected by store (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Unavailable { .. } | Self::Network(_)
        )
    }

    /// Whether the error makes every later request pointless, so the run
    /// must stop.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CredentialNotFound { .. }
                | Self::CredentialRead { .. }
                | Self::CredentialInvalid { .. }
                | Self::MissingToken { .. }
                | Self::Unauthorized { .. }
        )
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Map a non-success HTTP status to a store error.
pub fn classify_status(status: u16, message: String, retry_after_secs: Option<u64>) -> StoreError {
    match status {
        401 | 403 => StoreError::Unauthorized { status, message },
        429 => StoreError::RateLimited { retry_after_secs },
        500..=599 => StoreError::Unavailable { status, message },
        _ => StoreError::Rejected { status, message },
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(401, String::new(), None),
            StoreError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            classify_status(429, String::new(), Some(7)),
            StoreError::RateLimited {
                retry_after_secs: Some(7)
            }
        ));
        assert!(matches!(
            classify_status(503, "busy".into(), None),
            StoreError::Unavailable { status: 503, .. }
        ));
        assert!(matches!(
            classify_status(400, "bad field".into(), None),
            StoreError::Rejected { status: 400, .. }
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(StoreError::Network("timeout".to_string()).is_retryable());
        assert!(StoreError::RateLimited {
            retry_after_secs: None
        }
        .is_retryable());
        assert!(
            !StoreError::Rejected {
                status: 400,
                message: "invalid".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_fatal() {
        assert!(
            StoreError::Unauthorized {
                status: 403,
                message: String::new()
            }
            .is_fatal()
        );
        assert!(!StoreError::Network("reset".to_string()).is_fatal());
        assert!(
            !StoreError::Unavailable {
                status: 503,
                message: String::new()
            }
            .is_fatal()
        );
    }
}
