//! Records flowing through a pipeline.
//!
//! `RawRow` → `CleanRecord` → `DocumentRecord` → `Batch`. None of these are
//! persisted; each stage consumes the previous one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IdRejection, ModelError};
use crate::schema::PipelineKind;
use crate::value::FieldValue;

/// One data line of the source file, keyed by header column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Physical line number of the record (the header is line 1).
    pub line: u64,
    pub values: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new(line: u64) -> Self {
        Self {
            line,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// A validated row: every required field present, values coerced.
///
/// Absent optional fields are simply not in the map.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub line: u64,
    pub pipeline: PipelineKind,
    fields: BTreeMap<String, FieldValue>,
}

impl CleanRecord {
    pub fn new(line: u64, pipeline: PipelineKind) -> Self {
        Self {
            line,
            pipeline,
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }
}

/// Longest document identifier the store accepts, in UTF-8 bytes.
pub const MAX_DOCUMENT_ID_BYTES: usize = 1500;

/// Identifier of a document within its collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Accepts only ids Firestore would store as given.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        match Self::check(&value) {
            Some(reason) => Err(ModelError::InvalidDocumentId { value, reason }),
            None => Ok(Self(value)),
        }
    }

    fn check(value: &str) -> Option<IdRejection> {
        if value.is_empty() {
            Some(IdRejection::Empty)
        } else if value.contains('/') {
            Some(IdRejection::ContainsSlash)
        } else if value == "." || value == ".." {
            Some(IdRejection::DotSegment)
        } else if value.len() >= 4 && value.starts_with("__") && value.ends_with("__") {
            Some(IdRejection::Reserved)
        } else if value.len() > MAX_DOCUMENT_ID_BYTES {
            Some(IdRejection::TooLong {
                bytes: value.len(),
                max: MAX_DOCUMENT_ID_BYTES,
            })
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mapped record ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub collection: String,
    /// Source line, kept for failure reports.
    pub line: u64,
    pub fields: BTreeMap<String, FieldValue>,
}

impl DocumentRecord {
    /// Names of the fields this document sets.
    pub fn field_paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A bounded group of documents committed as one atomic write.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    index: usize,
    documents: Vec<DocumentRecord>,
}

impl Batch {
    /// `index` is 1-based within a run.
    pub fn new(index: usize, documents: Vec<DocumentRecord>) -> Self {
        Self { index, documents }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents.iter().map(|doc| doc.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_rejects_store_reserved_values() {
        assert!(DocumentId::new("madhubani").is_ok());
        assert!(DocumentId::new("").is_err());
        assert!(DocumentId::new("a/b").is_err());
        assert!(DocumentId::new("..").is_err());
    }

    fn rejection(value: &str) -> IdRejection {
        match DocumentId::new(value) {
            Err(ModelError::InvalidDocumentId { reason, .. }) => reason,
            Ok(id) => panic!("{id} was accepted"),
        }
    }

    #[test]
    fn document_id_rejects_reserved_names() {
        assert_eq!(rejection("__init__"), IdRejection::Reserved);
        assert_eq!(rejection("____"), IdRejection::Reserved);
        assert!(DocumentId::new("__draft").is_ok());
        assert!(DocumentId::new("___").is_ok());
        assert!(DocumentId::new("madhubani__").is_ok());
    }

    #[test]
    fn document_id_length_is_counted_in_bytes() {
        assert!(DocumentId::new("a".repeat(MAX_DOCUMENT_ID_BYTES)).is_ok());
        assert_eq!(
            rejection(&"a".repeat(MAX_DOCUMENT_ID_BYTES + 1)),
            IdRejection::TooLong {
                bytes: 1501,
                max: MAX_DOCUMENT_ID_BYTES
            }
        );
        // 3 bytes per character
        assert!(DocumentId::new("क".repeat(501)).is_err());
        assert!(DocumentId::new("क".repeat(500)).is_ok());
    }

    #[test]
    fn clean_record_text_lookup() {
        let mut record = CleanRecord::new(2, PipelineKind::Artists);
        record.insert("name", FieldValue::from("Ganga Devi"));
        record.insert("years_of_practice", FieldValue::Integer(30));
        assert_eq!(record.text("name"), Some("Ganga Devi"));
        assert_eq!(record.text("years_of_practice"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn batch_reports_ids_in_order() {
        let doc = |id: &str| DocumentRecord {
            id: DocumentId::new(id).unwrap(),
            collection: "artists".to_string(),
            line: 2,
            fields: BTreeMap::new(),
        };
        let batch = Batch::new(1, vec![doc("a"), doc("b")]);
        let ids: Vec<String> = batch.ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(batch.len(), 2);
    }
}
