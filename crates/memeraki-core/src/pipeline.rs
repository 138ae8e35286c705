//! Upload orchestration: source → sanitizer → mapper → committer.

use std::time::Instant;

use memeraki_ingest::{CsvSource, IngestError};
use memeraki_model::{PipelineKind, RunSummary};
use memeraki_store::DocumentStore;
use memeraki_transform::{DocumentMapper, IdStrategy, Sanitizer};
use tracing::{debug, info, info_span, warn};

use crate::committer::BatchCommitter;
use crate::error::FatalError;
use crate::events::{ProgressEvent, ProgressReporter, RowError};

/// One pipeline (artists or artforms) ready to run against a source file.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    pipeline: PipelineKind,
    sanitizer: Sanitizer,
    mapper: DocumentMapper,
    count_rows: bool,
}

impl UploadPipeline {
    pub fn new(pipeline: PipelineKind) -> Self {
        Self {
            pipeline,
            sanitizer: Sanitizer::for_pipeline(pipeline),
            mapper: DocumentMapper::for_pipeline(pipeline),
            count_rows: false,
        }
    }

    /// Write into `collection` instead of the pipeline default.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.mapper = DocumentMapper::new(self.pipeline.schema(), collection)
            .with_strategy(self.mapper.strategy());
        self
    }

    #[must_use]
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.mapper = self.mapper.with_strategy(strategy);
        self
    }

    /// Count data rows before the run so reporters can show a total.
    #[must_use]
    pub fn with_row_count(mut self, enabled: bool) -> Self {
        self.count_rows = enabled;
        self
    }

    pub fn pipeline(&self) -> PipelineKind {
        self.pipeline
    }

    pub fn collection(&self) -> &str {
        self.mapper.collection()
    }

    /// Run the upload to completion.
    ///
    /// Per-row and per-batch failures are reported and counted. Only
    /// setup and credential problems return `Err`, in which case no summary
    /// is produced.
    pub fn run<S: DocumentStore>(
        &self,
        source: &CsvSource,
        committer: &mut BatchCommitter<S>,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<RunSummary, FatalError> {
        let started = Instant::now();
        let span = info_span!(
            "upload",
            pipeline = self.pipeline.label(),
            collection = self.collection(),
            source = %source.path().display()
        );
        let _guard = span.enter();

        let reader = source.open()?;
        let check = self.sanitizer.check_headers(reader.headers());
        if !check.is_usable() {
            return Err(FatalError::SchemaMismatch {
                path: source.path().to_path_buf(),
                missing: check
                    .missing_required
                    .iter()
                    .map(|column| (*column).to_string())
                    .collect(),
            });
        }

        committer.check_connection(self.collection())?;

        let total_rows = if self.count_rows {
            source
                .count_rows()
                .inspect_err(|e| warn!(error = %e, "could not count source rows"))
                .ok()
        } else {
            None
        };
        reporter.report(&ProgressEvent::RunStarted {
            pipeline: self.pipeline,
            collection: self.collection().to_string(),
            total_rows,
        });

        let mut rows_read = 0;
        let mut rows_rejected = 0;
        for item in reader {
            let row = match item {
                Ok(row) => row,
                Err(IngestError::Record { line, message, .. }) => {
                    rows_read += 1;
                    rows_rejected += 1;
                    reporter.report(&ProgressEvent::RowRead { line });
                    reporter.report(&ProgressEvent::RowRejected(RowError::Unreadable {
                        line,
                        message,
                    }));
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            rows_read += 1;
            reporter.report(&ProgressEvent::RowRead { line: row.line });

            let doc = self
                .sanitizer
                .sanitize(&row)
                .map_err(RowError::from)
                .and_then(|record| self.mapper.map(record).map_err(RowError::from));
            match doc {
                Ok(doc) => committer.push(doc, reporter)?,
                Err(err) => {
                    rows_rejected += 1;
                    debug!(line = err.line(), fields = ?err.fields(), "row rejected");
                    reporter.report(&ProgressEvent::RowRejected(err));
                }
            }
        }

        let stats = committer.finish(reporter)?;
        let summary = RunSummary {
            rows_read,
            rows_rejected,
            documents_committed: stats.documents_committed,
            documents_created: stats.documents_created,
            documents_updated: stats.documents_updated,
            documents_failed: stats.documents_failed,
            batches_committed: stats.batches_committed,
            batches_failed: stats.batches_failed,
            elapsed: started.elapsed(),
        };
        debug_assert!(summary.is_balanced(), "row accounting out of balance: {summary}");
        info!(
            rows_read,
            rows_rejected,
            documents_committed = summary.documents_committed,
            documents_created = summary.documents_created,
            documents_updated = summary.documents_updated,
            batches_failed = summary.batches_failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "upload finished"
        );
        reporter.report(&ProgressEvent::RunComplete(summary));
        Ok(summary)
    }
}
