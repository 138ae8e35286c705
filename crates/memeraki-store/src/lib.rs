//! Document store access for the Memeraki uploaders.
//!
//! [`DocumentStore`] is the seam the batch committer writes through.
//! [`FirestoreStore`] talks to Firestore over REST; [`InMemoryStore`] backs
//! dry runs and tests. [`RetryPolicy`] decides how transient failures are
//! retried.

pub mod credential;
pub mod error;
pub mod firestore;
pub mod memory;
pub mod retry;
pub mod store;

pub use credential::{ACCESS_TOKEN_ENV, Credential, DEFAULT_DATABASE};
pub use error::{Result, StoreError, classify_status};
pub use firestore::{CREATED_AT_FIELD, EMULATOR_HOST_ENV, FirestoreStore, UPDATED_AT_FIELD};
pub use memory::InMemoryStore;
pub use retry::RetryPolicy;
pub use store::{CommitReceipt, DocumentStore, creation_flags};
