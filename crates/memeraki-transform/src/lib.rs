//! Row sanitizer and document mapper for the Memeraki uploaders.
//!
//! - [`Sanitizer`] validates a [`RawRow`](memeraki_model::RawRow) against the
//!   pipeline schema and yields a [`CleanRecord`](memeraki_model::CleanRecord)
//!   or a [`ValidationError`](memeraki_model::ValidationError).
//! - [`DocumentMapper`] derives a stable identifier and produces the
//!   [`DocumentRecord`](memeraki_model::DocumentRecord) written to the store.

pub mod hash;
pub mod mapper;
pub mod normalization;
pub mod sanitize;

pub use mapper::{DocumentMapper, IdStrategy, slugify};
pub use sanitize::Sanitizer;
