//! Batch-level and run-level errors.

use std::path::PathBuf;

use memeraki_ingest::IngestError;
use memeraki_model::DocumentId;
use memeraki_store::StoreError;
use thiserror::Error;

/// A batch whose commit failed. The run continues with the next batch.
#[derive(Debug, Error)]
#[error("batch {batch_index} failed after {attempts} attempt(s) ({} documents): {source}", document_ids.len())]
pub struct CommitError {
    pub batch_index: usize,
    /// Identifiers of every document in the batch, none of which was written.
    pub document_ids: Vec<DocumentId>,
    /// Source lines of those documents, in the same order.
    pub lines: Vec<u64>,
    pub attempts: u32,
    #[source]
    pub source: StoreError,
}

/// Errors that abort the whole run before a summary is produced.
#[derive(Debug, Error)]
pub enum FatalError {
    /// Source file missing, unreadable or not UTF-8.
    #[error(transparent)]
    Source(#[from] IngestError),

    /// Header lacks columns every row needs.
    #[error("{path} is missing required column(s): {}", missing.join(", "))]
    SchemaMismatch {
        path: PathBuf,
        missing: Vec<String>,
    },

    /// Credential could not be loaded or was refused at startup.
    #[error("store connection failed: {0}")]
    Connection(#[source] StoreError),

    /// Credential refused mid-run; every later batch would fail the same way.
    #[error("store rejected the credential during batch {batch_index}: {source}")]
    Unauthorized {
        batch_index: usize,
        #[source]
        source: StoreError,
    },

    #[error("batch size must be between 1 and {max}, got {size}")]
    InvalidBatchSize { size: usize, max: usize },

    /// Documents were pushed after the committer reached its final state.
    #[error("batch committer is already finished")]
    CommitterFinished,
}
