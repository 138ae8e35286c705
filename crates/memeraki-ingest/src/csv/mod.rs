//! CSV reading utilities.

mod header;
mod reader;

pub use header::normalize_header;
pub use reader::{CsvSource, RowReader, validate_encoding};
