//! In-process store used by `--dry-run` and by tests.

use std::collections::BTreeMap;

use memeraki_model::{Batch, DocumentId, FieldValue};
use tracing::debug;

use crate::error::Result;
use crate::store::{CommitReceipt, DocumentStore, creation_flags};

type Fields = BTreeMap<String, FieldValue>;

/// Keeps committed documents in memory, merging fields on overwrite the way
/// a masked update does.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: BTreeMap<String, BTreeMap<DocumentId, Fields>>,
    commits: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<&Fields> {
        let id = DocumentId::new(id).ok()?;
        self.collections.get(collection)?.get(&id)
    }

    /// Number of distinct documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(BTreeMap::is_empty)
    }

    /// Number of successful batch commits.
    pub fn commit_count(&self) -> usize {
        self.commits
    }
}

impl DocumentStore for InMemoryStore {
    fn check_connection(&mut self, _collection: &str) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self, batch: &Batch) -> Result<CommitReceipt> {
        let creates = creation_flags(batch, |doc| {
            self.collections
                .get(&doc.collection)
                .is_some_and(|docs| docs.contains_key(&doc.id))
        });
        for doc in batch.documents() {
            self.collections
                .entry(doc.collection.clone())
                .or_default()
                .entry(doc.id.clone())
                .or_default()
                .extend(doc.fields.clone());
        }
        self.commits += 1;
        let receipt = CommitReceipt::from_flags(&creates);
        debug!(
            batch = batch.index(),
            created = receipt.created,
            updated = receipt.updated,
            "batch stored in memory"
        );
        Ok(receipt)
    }
}
