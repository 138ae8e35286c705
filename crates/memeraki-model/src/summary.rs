use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Aggregate counts reported when a run reaches its final state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_rejected: usize,
    pub documents_committed: usize,
    /// Committed documents that did not exist before the run.
    pub documents_created: usize,
    /// Committed documents that replaced fields of an existing document.
    pub documents_updated: usize,
    /// Documents belonging to batches whose commit failed.
    pub documents_failed: usize,
    pub batches_committed: usize,
    pub batches_failed: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunSummary {
    #[must_use]
    pub fn has_batch_failures(&self) -> bool {
        self.batches_failed > 0
    }

    /// Every row read is either rejected, committed, or part of a failed
    /// batch, and every committed document was either created or updated.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.rows_read == self.rows_rejected + self.documents_committed + self.documents_failed
            && self.documents_committed == self.documents_created + self.documents_updated
    }

    #[must_use]
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.rows_read as f64 / secs
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read={} rejected={} committed={} batch_failures={}",
            self.rows_read, self.rows_rejected, self.documents_committed, self.batches_failed
        )
    }
}
