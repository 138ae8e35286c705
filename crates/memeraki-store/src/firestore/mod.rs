//! Firestore REST implementation of [`DocumentStore`](crate::DocumentStore).

mod client;
mod value;

pub use client::{CREATED_AT_FIELD, EMULATOR_HOST_ENV, FirestoreStore, UPDATED_AT_FIELD};
pub use value::{encode_fields, encode_value};
