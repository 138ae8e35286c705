//! Blocking Firestore REST client.
//!
//! A batch is written with a single `documents:commit` call, which Firestore
//! applies atomically. Every write is an update masked to the fields present
//! in the row, so columns missing from the source never clear stored values,
//! plus a server-side timestamp transform on [`UPDATED_AT_FIELD`].
//!
//! Before the commit a `documents:batchGet` finds which documents already
//! exist. New documents also get [`CREATED_AT_FIELD`] stamped. The lookup and
//! the commit are separate requests, so a document created concurrently by
//! another writer in between is counted as new.

use std::collections::HashSet;
use std::time::Duration;

use memeraki_model::{Batch, DocumentRecord};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::RETRY_AFTER;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::credential::Credential;
use crate::error::{Result, classify_status};
use crate::firestore::value::encode_fields;
use crate::store::{CommitReceipt, DocumentStore, creation_flags};

/// Environment variable naming a local emulator, e.g. `localhost:8080`.
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

/// Field stamped with the commit time on every write.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Field stamped with the commit time when a document is first written.
pub const CREATED_AT_FIELD: &str = "created_at";

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Document store backed by the Firestore REST API.
pub struct FirestoreStore {
    client: Client,
    base_url: String,
    credential: Credential,
}

impl FirestoreStore {
    /// Client for the production endpoint.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_base_url(credential, FIRESTORE_API_URL)
    }

    /// Client for a local emulator at `host` (`host:port`, no scheme).
    pub fn emulator(credential: Credential, host: &str) -> Result<Self> {
        Self::with_base_url(credential, format!("http://{}/v1", host.trim_end_matches('/')))
    }

    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn database_path(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.credential.project_id(),
            self.credential.database()
        )
    }

    fn documents_url(&self) -> String {
        format!("{}/{}/documents", self.base_url, self.database_path())
    }

    /// Fully qualified resource name of a document.
    pub fn document_name(&self, doc: &DocumentRecord) -> String {
        format!(
            "{}/documents/{}/{}",
            self.database_path(),
            doc.collection,
            doc.id
        )
    }

    /// JSON body of the lookup of `batch`'s documents. Only
    /// [`CREATED_AT_FIELD`] is fetched; existence is all that matters.
    pub fn batch_get_body(&self, batch: &Batch) -> Value {
        let mut names: Vec<String> = batch
            .documents()
            .iter()
            .map(|doc| self.document_name(doc))
            .collect();
        names.sort();
        names.dedup();
        json!({
            "documents": names,
            "mask": { "fieldPaths": [CREATED_AT_FIELD] },
        })
    }

    /// JSON body of the commit request for `batch`.
    ///
    /// `creates[i]` marks the documents written for the first time; those
    /// get a [`CREATED_AT_FIELD`] transform as well.
    pub fn commit_body(&self, batch: &Batch, creates: &[bool]) -> Value {
        let writes: Vec<Value> = batch
            .documents()
            .iter()
            .enumerate()
            .map(|(idx, doc)| {
                let mut transforms = vec![server_time(UPDATED_AT_FIELD)];
                if creates.get(idx).copied().unwrap_or(false) {
                    transforms.push(server_time(CREATED_AT_FIELD));
                }
                json!({
                    "update": {
                        "name": self.document_name(doc),
                        "fields": encode_fields(&doc.fields),
                    },
                    "updateMask": { "fieldPaths": doc.field_paths().collect::<Vec<_>>() },
                    "updateTransforms": transforms,
                })
            })
            .collect();
        json!({ "writes": writes })
    }

    /// Resource names of the documents of `batch` that already exist.
    fn existing_documents(&self, batch: &Batch) -> Result<HashSet<String>> {
        let url = format!("{}:batchGet", self.documents_url());
        let response = self.send(self.client.post(url).json(&self.batch_get_body(batch)))?;
        let items: Vec<Value> = response.json()?;
        Ok(found_names(&items))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(self.credential.bearer_token())
            .send()?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());
        let body = response.text().unwrap_or_default();
        Err(classify_status(status, error_message(&body), retry_after))
    }
}

impl DocumentStore for FirestoreStore {
    fn check_connection(&mut self, collection: &str) -> Result<()> {
        let url = format!("{}/{collection}?pageSize=1", self.documents_url());
        debug!(
            %url,
            principal = self.credential.principal().unwrap_or("unknown"),
            "checking store connection"
        );
        self.send(self.client.get(url))?;
        info!(
            project = self.credential.project_id(),
            database = self.credential.database(),
            collection,
            "connected to Firestore"
        );
        Ok(())
    }

    fn commit(&mut self, batch: &Batch) -> Result<CommitReceipt> {
        let existing = self.existing_documents(batch)?;
        let creates = creation_flags(batch, |doc| existing.contains(&self.document_name(doc)));

        let url = format!("{}:commit", self.documents_url());
        let body = self.commit_body(batch, &creates);
        self.send(self.client.post(url).json(&body))?;

        let receipt = CommitReceipt::from_flags(&creates);
        debug!(
            batch = batch.index(),
            created = receipt.created,
            updated = receipt.updated,
            "batch committed"
        );
        Ok(receipt)
    }
}

fn server_time(field: &str) -> Value {
    json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" })
}

/// Names of the `found` entries of a `batchGet` response; `missing` entries
/// are documents that do not exist yet.
fn found_names(items: &[Value]) -> HashSet<String> {
    items
        .iter()
        .filter_map(|item| item.pointer("/found/name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Pull `error.message` out of a Google API error body, falling back to the
/// raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use memeraki_model::{DocumentId, FieldValue};

    use super::*;

    fn store() -> FirestoreStore {
        let credential = Credential::emulator("memeraki-test");
        FirestoreStore::emulator(credential, "localhost:8080").unwrap()
    }

    fn doc(id: &str) -> DocumentRecord {
        DocumentRecord {
            id: DocumentId::new(id).unwrap(),
            collection: "artists".to_string(),
            line: 2,
            fields: BTreeMap::from([
                ("name".to_string(), FieldValue::from("Ganga Devi")),
                ("years_of_practice".to_string(), FieldValue::Integer(40)),
            ]),
        }
    }

    #[test]
    fn emulator_base_url() {
        assert_eq!(store().base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn document_name_is_fully_qualified() {
        assert_eq!(
            store().document_name(&doc("ganga-devi")),
            "projects/memeraki-test/databases/(default)/documents/artists/ganga-devi"
        );
    }

    #[test]
    fn commit_body_masks_fields_and_stamps_time() {
        let batch = Batch::new(1, vec![doc("ganga-devi"), doc("jamini-roy")]);
        let body = store().commit_body(&batch, &[false, true]);
        let writes = body["writes"].as_array().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(
            writes[0],
            json!({
                "update": {
                    "name": "projects/memeraki-test/databases/(default)/documents/artists/ganga-devi",
                    "fields": {
                        "name": { "stringValue": "Ganga Devi" },
                        "years_of_practice": { "integerValue": "40" }
                    }
                },
                "updateMask": { "fieldPaths": ["name", "years_of_practice"] },
                "updateTransforms": [{
                    "fieldPath": "updated_at",
                    "setToServerValue": "REQUEST_TIME"
                }]
            })
        );
        assert_eq!(
            writes[1]["updateTransforms"],
            json!([
                { "fieldPath": "updated_at", "setToServerValue": "REQUEST_TIME" },
                { "fieldPath": "created_at", "setToServerValue": "REQUEST_TIME" }
            ])
        );
    }

    #[test]
    fn batch_get_asks_for_each_document_once() {
        let batch = Batch::new(1, vec![doc("jamini-roy"), doc("ganga-devi"), doc("jamini-roy")]);
        assert_eq!(
            store().batch_get_body(&batch),
            json!({
                "documents": [
                    "projects/memeraki-test/databases/(default)/documents/artists/ganga-devi",
                    "projects/memeraki-test/databases/(default)/documents/artists/jamini-roy"
                ],
                "mask": { "fieldPaths": ["created_at"] }
            })
        );
    }

    #[test]
    fn existing_documents_come_from_found_entries() {
        let response = json!([
            {
                "found": {
                    "name": "projects/p/databases/(default)/documents/artists/ganga-devi",
                    "fields": {},
                    "createTime": "2024-01-01T00:00:00Z",
                    "updateTime": "2024-01-01T00:00:00Z"
                },
                "readTime": "2024-06-01T00:00:00Z"
            },
            {
                "missing": "projects/p/databases/(default)/documents/artists/jamini-roy",
                "readTime": "2024-06-01T00:00:00Z"
            }
        ]);
        let found = found_names(response.as_array().unwrap());
        assert_eq!(found.len(), 1);
        assert!(found.contains("projects/p/databases/(default)/documents/artists/ganga-devi"));
    }

    #[test]
    fn extracts_google_error_message() {
        let body = r#"{"error": {"code": 400, "message": "Invalid document name", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "Invalid document name");
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
    }
}
