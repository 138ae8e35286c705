//! Progress events and the reporter seam.
//!
//! Reporters are purely observational: the committer and the upload loop
//! emit events, but nothing a reporter does feeds back into control flow.

use std::fmt;

use memeraki_model::{MappingError, PipelineKind, RunSummary, ValidationError};
use tracing::{error, info, warn};

use crate::error::CommitError;

/// Why a row never became a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    Validation(ValidationError),
    Mapping(MappingError),
    /// The reader could not decode the record at all.
    Unreadable { line: u64, message: String },
}

impl RowError {
    pub fn line(&self) -> u64 {
        match self {
            Self::Validation(err) => err.line,
            Self::Mapping(err) => err.line(),
            Self::Unreadable { line, .. } => *line,
        }
    }

    /// Names of the offending fields, if known.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Validation(err) => err.fields(),
            Self::Mapping(MappingError::MissingNaturalKey { field, .. }) => vec![field.as_str()],
            Self::Mapping(MappingError::InvalidIdentifier { .. }) | Self::Unreadable { .. } => {
                Vec::new()
            }
        }
    }

    /// Render including raw cell values. Only for operators who opted in
    /// to logging row data.
    pub fn detailed(&self) -> String {
        match self {
            Self::Validation(err) => {
                let issues: Vec<String> = err
                    .issues
                    .iter()
                    .map(|issue| match &issue.value {
                        Some(value) => format!("{issue} (got {value:?})"),
                        None => issue.to_string(),
                    })
                    .collect();
                format!("line {}: {}", err.line, issues.join("; "))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "{err}"),
            Self::Unreadable { line, message } => write!(f, "line {line}: unreadable record: {message}"),
        }
    }
}

impl From<ValidationError> for RowError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<MappingError> for RowError {
    fn from(err: MappingError) -> Self {
        Self::Mapping(err)
    }
}

/// Something the operator may want to see.
#[derive(Debug)]
pub enum ProgressEvent {
    RunStarted {
        pipeline: PipelineKind,
        collection: String,
        /// Data rows in the source, when counted up front.
        total_rows: Option<usize>,
    },
    /// Emitted for every row read, accepted or not.
    RowRead { line: u64 },
    RowRejected(RowError),
    BatchCommitted {
        index: usize,
        size: usize,
        /// Documents in the batch that did not exist before.
        created: usize,
    },
    BatchFailed(CommitError),
    RunComplete(RunSummary),
}

/// Receives progress events.
pub trait ProgressReporter {
    fn report(&mut self, event: &ProgressEvent);
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &mut R {
    fn report(&mut self, event: &ProgressEvent) {
        (**self).report(event);
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for Box<R> {
    fn report(&mut self, event: &ProgressEvent) {
        (**self).report(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&mut self, _event: &ProgressEvent) {}
}

/// Renders events as `tracing` log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter {
    log_data: bool,
}

impl LogReporter {
    /// `log_data` enables raw cell values in rejection messages.
    pub fn new(log_data: bool) -> Self {
        Self { log_data }
    }
}

impl ProgressReporter for LogReporter {
    fn report(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted {
                pipeline,
                collection,
                total_rows,
            } => info!(
                pipeline = pipeline.label(),
                collection = %collection,
                total_rows = ?total_rows,
                "upload started"
            ),
            ProgressEvent::RowRead { .. } => {}
            ProgressEvent::RowRejected(err) => {
                let message = if self.log_data {
                    err.detailed()
                } else {
                    err.to_string()
                };
                warn!(line = err.line(), "row rejected: {message}");
            }
            ProgressEvent::BatchCommitted {
                index,
                size,
                created,
            } => {
                info!(batch = index, documents = size, created, "batch committed");
            }
            ProgressEvent::BatchFailed(err) => {
                let ids: Vec<&str> = err.document_ids.iter().map(|id| id.as_str()).collect();
                error!(
                    batch = err.batch_index,
                    documents = ids.len(),
                    ids = %ids.join(","),
                    error = %err.source,
                    "batch failed"
                );
            }
            ProgressEvent::RunComplete(summary) => info!(%summary, "upload complete"),
        }
    }
}
