//! Batch committer.
//!
//! Buffers mapped documents and writes them to the store in groups of at most
//! `batch_size`, one outstanding commit at a time. A failed batch is reported
//! and counted; the committer then carries on with the next one.
//!
//! ```text
//! Accumulating -> Committing -> Committed | Failed -> Accumulating ... -> Done
//! ```

use std::time::Duration;

use memeraki_model::{Batch, DocumentRecord};
use memeraki_store::{DocumentStore, RetryPolicy};
use tracing::{debug, info_span};

use crate::error::{CommitError, FatalError};
use crate::events::{ProgressEvent, ProgressReporter};

/// Most writes a single store commit accepts.
pub const MAX_BATCH_SIZE: usize = 500;

/// Batch size used when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = MAX_BATCH_SIZE;

/// Tuning for a [`BatchCommitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitterConfig {
    pub batch_size: usize,
    pub retry: RetryPolicy,
    /// Pause after each full batch, to stay under store write quotas.
    pub batch_delay: Duration,
}

impl Default for CommitterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
            batch_delay: Duration::ZERO,
        }
    }
}

impl CommitterConfig {
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<(), FatalError> {
        if (1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            Ok(())
        } else {
            Err(FatalError::InvalidBatchSize {
                size: self.batch_size,
                max: MAX_BATCH_SIZE,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitterState {
    Accumulating,
    Committing,
    Committed,
    Failed,
    Done,
}

/// Per-batch outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub documents_committed: usize,
    pub documents_created: usize,
    pub documents_updated: usize,
    pub documents_failed: usize,
    pub batches_committed: usize,
    pub batches_failed: usize,
}

impl CommitStats {
    pub fn batches(&self) -> usize {
        self.batches_committed + self.batches_failed
    }
}

/// Groups documents into batches and commits them through a [`DocumentStore`].
pub struct BatchCommitter<S> {
    store: S,
    config: CommitterConfig,
    buffer: Vec<DocumentRecord>,
    next_index: usize,
    state: CommitterState,
    stats: CommitStats,
}

impl<S: DocumentStore> BatchCommitter<S> {
    pub fn new(store: S, config: CommitterConfig) -> Result<Self, FatalError> {
        config.validate()?;
        Ok(Self {
            store,
            buffer: Vec::with_capacity(config.batch_size),
            config,
            next_index: 1,
            state: CommitterState::Accumulating,
            stats: CommitStats::default(),
        })
    }

    pub fn state(&self) -> CommitterState {
        self.state
    }

    pub fn stats(&self) -> CommitStats {
        self.stats
    }

    pub fn config(&self) -> &CommitterConfig {
        &self.config
    }

    /// Documents waiting for the next commit.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Verify the store is reachable before any document is pushed.
    pub fn check_connection(&mut self, collection: &str) -> Result<(), FatalError> {
        self.store
            .check_connection(collection)
            .map_err(FatalError::Connection)
    }

    /// Buffer one document, committing when the batch is full.
    ///
    /// Only an unusable credential is returned as an error; failed batches
    /// are reported through `reporter` and counted.
    pub fn push(
        &mut self,
        doc: DocumentRecord,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<(), FatalError> {
        if self.state == CommitterState::Done {
            return Err(FatalError::CommitterFinished);
        }
        self.state = CommitterState::Accumulating;
        self.buffer.push(doc);

        if self.buffer.len() >= self.config.batch_size {
            self.flush(reporter)?;
            if !self.config.batch_delay.is_zero() {
                debug!(delay_ms = self.config.batch_delay.as_millis() as u64, "pausing between batches");
                std::thread::sleep(self.config.batch_delay);
            }
        }
        Ok(())
    }

    /// Commit whatever is buffered and move to `Done`.
    pub fn finish(&mut self, reporter: &mut dyn ProgressReporter) -> Result<CommitStats, FatalError> {
        if self.state != CommitterState::Done {
            self.flush(reporter)?;
            self.state = CommitterState::Done;
        }
        Ok(self.stats)
    }

    fn flush(&mut self, reporter: &mut dyn ProgressReporter) -> Result<(), FatalError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = Batch::new(
            self.next_index,
            std::mem::replace(&mut self.buffer, Vec::with_capacity(self.config.batch_size)),
        );
        self.next_index += 1;
        self.state = CommitterState::Committing;

        let span = info_span!("batch", index = batch.index(), size = batch.len());
        let _guard = span.enter();

        let retry = self.config.retry;
        let store = &mut self.store;
        let mut attempts = 0;
        let result = retry.run(|attempt| {
            attempts = attempt;
            store.commit(&batch)
        });

        match result {
            Ok(receipt) => {
                self.state = CommitterState::Committed;
                self.stats.batches_committed += 1;
                self.stats.documents_committed += batch.len();
                self.stats.documents_created += receipt.created;
                self.stats.documents_updated += receipt.updated;
                reporter.report(&ProgressEvent::BatchCommitted {
                    index: batch.index(),
                    size: batch.len(),
                    created: receipt.created,
                });
                Ok(())
            }
            Err(source) if source.is_fatal() => {
                self.state = CommitterState::Failed;
                Err(FatalError::Unauthorized {
                    batch_index: batch.index(),
                    source,
                })
            }
            Err(source) => {
                self.state = CommitterState::Failed;
                self.stats.batches_failed += 1;
                self.stats.documents_failed += batch.len();
                let err = CommitError {
                    batch_index: batch.index(),
                    document_ids: batch.ids(),
                    lines: batch.documents().iter().map(|doc| doc.line).collect(),
                    attempts,
                    source,
                };
                reporter.report(&ProgressEvent::BatchFailed(err));
                Ok(())
            }
        }
    }
}
