//! Credential handle for the document store.
//!
//! Loaded once at startup and passed explicitly to the store client; nothing
//! in this crate reads credentials from global state after that.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, StoreError};

/// Environment variable consulted for a bearer token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Database used when the credential file does not name one.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Token accepted by the local Firestore emulator.
const EMULATOR_TOKEN: &str = "owner";

/// Subset of a service-account key file we understand.
#[derive(Deserialize)]
struct CredentialFile {
    project_id: String,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    client_email: Option<String>,
}

/// Opaque credential handle: project, database and bearer token.
#[derive(Clone)]
pub struct Credential {
    project_id: String,
    database: String,
    access_token: String,
    principal: Option<String>,
}

impl Credential {
    /// Load from a JSON key file, taking the token from
    /// [`ACCESS_TOKEN_ENV`] when set.
    pub fn load(path: &Path) -> Result<Self> {
        let env_token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty());
        Self::load_with_token(path, env_token)
    }

    /// Load from a JSON key file; `token` overrides the file's `access_token`.
    pub fn load_with_token(path: &Path, token: Option<String>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::CredentialNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::CredentialRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let file: CredentialFile =
            serde_json::from_str(&content).map_err(|e| StoreError::CredentialInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if file.project_id.trim().is_empty() {
            return Err(StoreError::CredentialInvalid {
                path: path.to_path_buf(),
                message: "project_id is empty".to_string(),
            });
        }
        let access_token = token
            .or(file.access_token)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| StoreError::MissingToken {
                path: path.to_path_buf(),
                env: ACCESS_TOKEN_ENV,
            })?;

        Ok(Self {
            project_id: file.project_id.trim().to_string(),
            database: file
                .database
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            access_token,
            principal: file.client_email,
        })
    }

    /// Project and database from a key file, with the emulator's token.
    pub fn load_for_emulator(path: &Path) -> Result<Self> {
        Self::load_with_token(path, Some(EMULATOR_TOKEN.to_string()))
    }

    /// Credential for a local emulator, which accepts any project.
    pub fn emulator(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            access_token: EMULATOR_TOKEN.to_string(),
            principal: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Service account e-mail, when the key file carries one.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub(crate) fn bearer_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("principal", &self.principal)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn key_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn loads_token_from_file() {
        let file = key_file(r#"{"project_id": "memeraki-prod", "access_token": "ya29.abc"}"#);
        let credential = Credential::load_with_token(file.path(), None).unwrap();
        assert_eq!(credential.project_id(), "memeraki-prod");
        assert_eq!(credential.database(), DEFAULT_DATABASE);
        assert_eq!(credential.bearer_token(), "ya29.abc");
    }

    #[test]
    fn explicit_token_wins_over_file() {
        let file = key_file(
            r#"{"project_id": "p", "access_token": "old", "client_email": "svc@p.iam.gserviceaccount.com"}"#,
        );
        let credential =
            Credential::load_with_token(file.path(), Some("fresh".to_string())).unwrap();
        assert_eq!(credential.bearer_token(), "fresh");
        assert_eq!(credential.principal(), Some("svc@p.iam.gserviceaccount.com"));
    }

    #[test]
    fn service_account_without_token_is_rejected() {
        let file = key_file(r#"{"type": "service_account", "project_id": "p", "private_key": "x"}"#);
        let err = Credential::load_with_token(file.path(), None).unwrap_err();
        assert!(matches!(err, StoreError::MissingToken { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_and_malformed_files() {
        let err = Credential::load_with_token(Path::new("/no/such/key.json"), None).unwrap_err();
        assert!(matches!(err, StoreError::CredentialNotFound { .. }));

        let file = key_file("not json");
        let err = Credential::load_with_token(file.path(), None).unwrap_err();
        assert!(matches!(err, StoreError::CredentialInvalid { .. }));
    }

    #[test]
    fn emulator_credential_from_key_file() {
        let file = key_file(r#"{"project_id": "demo", "database": "staging"}"#);
        let credential = Credential::load_for_emulator(file.path()).unwrap();
        assert_eq!(credential.project_id(), "demo");
        assert_eq!(credential.database(), "staging");
        assert_eq!(credential.bearer_token(), "owner");
    }

    #[test]
    fn debug_redacts_token() {
        let credential = Credential::emulator("demo").with_database("staging");
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("owner"));
        assert_eq!(credential.database(), "staging");
    }
}
