//! Store behaviour through the `DocumentStore` trait.

use std::collections::BTreeMap;

use memeraki_model::{Batch, DocumentId, DocumentRecord, FieldValue};
use memeraki_store::{
    CommitReceipt, Credential, DocumentStore, FirestoreStore, InMemoryStore, RetryPolicy,
};

fn batch(index: usize, ids: &[&str]) -> Batch {
    let documents = ids
        .iter()
        .map(|id| DocumentRecord {
            id: DocumentId::new(*id).unwrap(),
            collection: "artists".to_string(),
            line: 2,
            fields: BTreeMap::from([("name".to_string(), FieldValue::from(*id))]),
        })
        .collect();
    Batch::new(index, documents)
}

#[test]
fn boxed_store_commits_through_trait_object() {
    let mut store: Box<dyn DocumentStore> = Box::new(InMemoryStore::new());
    store.check_connection("artists").unwrap();
    let first = store.commit(&batch(1, &["a", "b"])).unwrap();
    let second = store.commit(&batch(2, &["b", "c"])).unwrap();
    assert_eq!(first, CommitReceipt { created: 2, updated: 0 });
    assert_eq!(second, CommitReceipt { created: 1, updated: 1 });
    assert_eq!(second.documents(), 2);
}

#[test]
fn unreachable_firestore_is_a_retryable_network_error() {
    // Nothing listens on port 1.
    let mut store =
        FirestoreStore::emulator(Credential::emulator("memeraki-test"), "127.0.0.1:1").unwrap();

    let err = store.check_connection("artists").unwrap_err();
    assert!(err.is_retryable(), "{err}");
    assert!(!err.is_fatal());

    let mut calls = 0;
    let result = RetryPolicy::immediate(2).run(|_| {
        calls += 1;
        store.commit(&batch(1, &["a"]))
    });
    assert!(result.is_err());
    assert_eq!(calls, 2);
}
