//! Batch committer and upload orchestration for the Memeraki uploaders.
//!
//! Rows flow one at a time from the source reader through the sanitizer and
//! mapper into a [`BatchCommitter`], which commits fixed-size batches to a
//! [`DocumentStore`](memeraki_store::DocumentStore). Row and batch failures
//! are reported as [`ProgressEvent`]s and counted; only [`FatalError`]s stop
//! a run.

pub mod committer;
pub mod error;
pub mod events;
pub mod pipeline;

pub use committer::{
    BatchCommitter, CommitStats, CommitterConfig, CommitterState, DEFAULT_BATCH_SIZE,
    MAX_BATCH_SIZE,
};
pub use error::{CommitError, FatalError};
pub use events::{LogReporter, NullReporter, ProgressEvent, ProgressReporter, RowError};
pub use pipeline::UploadPipeline;
