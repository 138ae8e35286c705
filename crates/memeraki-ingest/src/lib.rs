//! Source reader for the Memeraki uploaders.
//!
//! Turns a delimited file with a header row into a lazy, restartable
//! sequence of [`RawRow`](memeraki_model::RawRow)s, one per record, each
//! tagged with its physical line number.
//!
//! # Example
//!
//! ```ignore
//! use memeraki_ingest::CsvSource;
//!
//! let source = CsvSource::new("data/artists.csv");
//! let reader = source.open()?;
//! println!("columns: {:?}", reader.headers());
//! for row in reader {
//!     let row = row?;
//!     println!("line {}: {:?}", row.line, row.get("slug"));
//! }
//! ```

mod csv;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use crate::csv::{CsvSource, RowReader, normalize_header, validate_encoding};
