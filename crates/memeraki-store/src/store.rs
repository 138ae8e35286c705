//! The seam between the batch committer and a concrete document store.

use std::collections::HashSet;

use memeraki_model::{Batch, DocumentRecord};

use crate::error::Result;

/// What a committed batch did to its collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Documents that did not exist before the commit.
    pub created: usize,
    /// Documents that already existed and had fields replaced.
    pub updated: usize,
}

impl CommitReceipt {
    /// Count the writes flagged by [`creation_flags`].
    pub fn from_flags(creates: &[bool]) -> Self {
        let created = creates.iter().filter(|creates| **creates).count();
        Self {
            created,
            updated: creates.len() - created,
        }
    }

    pub fn documents(&self) -> usize {
        self.created + self.updated
    }
}

/// Whether each write of `batch` creates its document.
///
/// `exists` answers for documents already in the store. When an id appears
/// more than once in a batch only its first write can create it.
pub fn creation_flags(
    batch: &Batch,
    mut exists: impl FnMut(&DocumentRecord) -> bool,
) -> Vec<bool> {
    let mut seen = HashSet::new();
    batch
        .documents()
        .iter()
        .map(|doc| seen.insert((doc.collection.as_str(), doc.id.as_str())) && !exists(doc))
        .collect()
}

/// A remote (or in-process) document store that accepts atomic batch writes.
///
/// `commit` must be all-or-nothing: when it returns an error, none of the
/// batch's documents may have been written.
pub trait DocumentStore {
    /// Verify the store is reachable and accepts the credential.
    fn check_connection(&mut self, collection: &str) -> Result<()>;

    /// Write every document of `batch`, creating or merging by id.
    fn commit(&mut self, batch: &Batch) -> Result<CommitReceipt>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &mut S {
    fn check_connection(&mut self, collection: &str) -> Result<()> {
        (**self).check_connection(collection)
    }

    fn commit(&mut self, batch: &Batch) -> Result<CommitReceipt> {
        (**self).commit(batch)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn check_connection(&mut self, collection: &str) -> Result<()> {
        (**self).check_connection(collection)
    }

    fn commit(&mut self, batch: &Batch) -> Result<CommitReceipt> {
        (**self).commit(batch)
    }
}
