//! Shared types for the Memeraki artist and artform uploaders.

pub mod error;
pub mod record;
pub mod schema;
pub mod summary;
pub mod value;

pub use error::{FieldIssue, IdRejection, IssueKind, MappingError, ModelError, ValidationError};
pub use record::{Batch, CleanRecord, DocumentId, DocumentRecord, MAX_DOCUMENT_ID_BYTES, RawRow};
pub use schema::{
    ARTFORM_SCHEMA, ARTIST_SCHEMA, FieldKind, FieldSpec, HERITAGE_LEVELS, HeaderCheck,
    PipelineKind, Schema,
};
pub use summary::RunSummary;
pub use value::FieldValue;
