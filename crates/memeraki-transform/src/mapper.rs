//! Document mapper: `CleanRecord` → `DocumentRecord`.
//!
//! The document identifier is a pure function of the natural-key fields, so
//! re-running an upload over the same file overwrites the same documents
//! instead of creating new ones.

use std::fmt;

use memeraki_model::{
    CleanRecord, DocumentId, DocumentRecord, MappingError, ModelError, PipelineKind, Schema,
};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::hash::natural_key_hash;

/// How document identifiers are derived from the natural key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// The natural key as written, trimmed. Existing documents keyed by
    /// their slug keep their ids.
    #[default]
    Verbatim,
    /// URL-safe slug of the natural key, e.g. `ganga-devi`.
    Slug,
    /// Truncated SHA-256 of the natural key, 32 hex characters.
    Hash,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verbatim => f.write_str("verbatim"),
            Self::Slug => f.write_str("slug"),
            Self::Hash => f.write_str("hash"),
        }
    }
}

/// Maps clean records of one pipeline into documents of one collection.
#[derive(Debug, Clone)]
pub struct DocumentMapper {
    schema: &'static Schema,
    collection: String,
    strategy: IdStrategy,
}

impl DocumentMapper {
    pub fn new(schema: &'static Schema, collection: impl Into<String>) -> Self {
        Self {
            schema,
            collection: collection.into(),
            strategy: IdStrategy::default(),
        }
    }

    /// Mapper writing to the pipeline's default collection.
    pub fn for_pipeline(pipeline: PipelineKind) -> Self {
        Self::new(pipeline.schema(), pipeline.default_collection())
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: IdStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Derive the identifier for a record without consuming it.
    pub fn document_id(&self, record: &CleanRecord) -> Result<DocumentId, MappingError> {
        let mut parts = Vec::with_capacity(self.schema.natural_key.len());
        for field in self.schema.natural_key {
            let value = record
                .get(field)
                .map(ToString::to_string)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| MappingError::MissingNaturalKey {
                    line: record.line,
                    field: (*field).to_string(),
                })?;
            parts.push(value);
        }

        let id = match self.strategy {
            IdStrategy::Verbatim => parts
                .iter()
                .map(|part| part.trim())
                .collect::<Vec<_>>()
                .join("-"),
            IdStrategy::Slug => slugify(&parts.join("-")),
            IdStrategy::Hash => natural_key_hash(&parts),
        };
        DocumentId::new(id).map_err(|err| match err {
            ModelError::InvalidDocumentId { reason, .. } => MappingError::InvalidIdentifier {
                line: record.line,
                value: preview(&parts.join(" ")),
                reason,
            },
        })
    }

    pub fn map(&self, record: CleanRecord) -> Result<DocumentRecord, MappingError> {
        let id = self.document_id(&record)?;
        let line = record.line;
        Ok(DocumentRecord {
            id,
            collection: self.collection.clone(),
            line,
            fields: record.into_fields(),
        })
    }
}

/// Lowercase the value and collapse every run of characters other than
/// alphanumerics, combining marks and `_` into a single `-`.
///
/// Input is NFC-normalized first, so precomposed and decomposed spellings
/// of the same name give the same slug.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.nfc() {
        if c.is_alphanumeric() || is_combining_mark(c) || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Natural-key values can be arbitrarily long; error messages show a prefix.
fn preview(value: &str) -> String {
    const MAX_CHARS: usize = 40;
    match value.char_indices().nth(MAX_CHARS) {
        Some((end, _)) => format!("{}...", &value[..end]),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memeraki_model::{FieldValue, IdRejection};

    fn record(slug: &str) -> CleanRecord {
        let mut record = CleanRecord::new(4, PipelineKind::Artists);
        record.insert("name", FieldValue::from("Jamini Roy"));
        record.insert("slug", FieldValue::from(slug));
        record
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("ganga-devi"), "ganga-devi");
        assert_eq!(slugify("  Ganga  Devi!! "), "ganga-devi");
        assert_eq!(slugify("madhubani_art"), "madhubani_art");
        assert_eq!(slugify("Pattachitra / Odisha"), "pattachitra-odisha");
        assert_eq!(slugify("--!!--"), "");
    }

    #[test]
    fn slugify_keeps_combining_marks_inside_words() {
        // virama and vowel signs are marks, not separators
        assert_eq!(slugify("कृष्ण लीला"), "कृष्ण-लीला");
        assert_eq!(slugify("Kalamkari कलमकारी"), "kalamkari-कलमकारी");
        // decomposed e + acute composes to the same slug
        assert_eq!(slugify("Cafe\u{301} Art"), slugify("Caf\u{e9} Art"));
        assert_eq!(slugify("Cafe\u{301} Art"), "caf\u{e9}-art");
    }

    #[test]
    fn verbatim_is_the_default_and_keeps_the_slug_as_written() {
        let mapper = DocumentMapper::for_pipeline(PipelineKind::Artforms);
        assert_eq!(mapper.strategy(), IdStrategy::Verbatim);
        for slug in ["Madhubani_Art", "st.john", "Warli Painting", "madhubani"] {
            let mut record = CleanRecord::new(3, PipelineKind::Artforms);
            record.insert("name", FieldValue::from("Any"));
            record.insert("slug", FieldValue::from(format!("  {slug} ")));
            assert_eq!(mapper.map(record).unwrap().id.as_str(), slug);
        }
    }

    #[test]
    fn slug_strategy_is_opt_in() {
        let mapper =
            DocumentMapper::for_pipeline(PipelineKind::Artists).with_strategy(IdStrategy::Slug);
        assert_eq!(mapper.map(record("Madhubani_Art")).unwrap().id.as_str(), "madhubani_art");
        assert_eq!(mapper.map(record("st.john")).unwrap().id.as_str(), "st-john");
    }

    #[test]
    fn maps_into_collection_with_slug_id() {
        let mapper = DocumentMapper::for_pipeline(PipelineKind::Artists);
        let doc = mapper.map(record("jamini-roy")).unwrap();
        assert_eq!(doc.id.as_str(), "jamini-roy");
        assert_eq!(doc.collection, "artists");
        assert_eq!(doc.line, 4);
        assert_eq!(doc.fields.len(), 2);
    }

    #[test]
    fn identical_records_map_to_identical_ids() {
        for strategy in [IdStrategy::Verbatim, IdStrategy::Slug, IdStrategy::Hash] {
            let mapper =
                DocumentMapper::for_pipeline(PipelineKind::Artists).with_strategy(strategy);
            let first = mapper.map(record("jamini-roy")).unwrap();
            let second = mapper.map(record("jamini-roy")).unwrap();
            assert_eq!(first.id, second.id, "{strategy}");
        }
    }

    #[test]
    fn hash_strategy_produces_hex_ids() {
        let mapper = DocumentMapper::new(PipelineKind::Artists.schema(), "artists_v2")
            .with_strategy(IdStrategy::Hash);
        let doc = mapper.map(record("jamini-roy")).unwrap();
        assert_eq!(doc.id.as_str().len(), 32);
        assert!(doc.id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(doc.collection, "artists_v2");
    }

    #[test]
    fn missing_natural_key_is_a_mapping_error() {
        let mapper = DocumentMapper::for_pipeline(PipelineKind::Artists);
        let mut record = CleanRecord::new(6, PipelineKind::Artists);
        record.insert("name", FieldValue::from("Nobody"));
        let err = mapper.map(record).unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingNaturalKey {
                line: 6,
                field: "slug".to_string()
            }
        );
    }

    #[test]
    fn punctuation_only_slug_is_a_mapping_error() {
        let mapper =
            DocumentMapper::for_pipeline(PipelineKind::Artists).with_strategy(IdStrategy::Slug);
        let err = mapper.map(record("!!!")).unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvalidIdentifier {
                line: 4,
                reason: IdRejection::Empty,
                ..
            }
        ));
    }

    #[test]
    fn ids_the_store_refuses_are_mapping_errors() {
        let mapper = DocumentMapper::for_pipeline(PipelineKind::Artists);
        let err = mapper.map(record("__init__")).unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvalidIdentifier {
                reason: IdRejection::Reserved,
                ..
            }
        ));

        let err = mapper.map(record(&"x".repeat(2000))).unwrap_err();
        match err {
            MappingError::InvalidIdentifier { reason, value, .. } => {
                assert_eq!(reason, IdRejection::TooLong { bytes: 2000, max: 1500 });
                assert_eq!(value.len(), 43);
            }
            other => panic!("unexpected {other}"),
        }

        let err = mapper.map(record("folk/tribal")).unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvalidIdentifier {
                reason: IdRejection::ContainsSlash,
                ..
            }
        ));
    }
}
