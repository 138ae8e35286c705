//! Cell-level normalization used by the sanitizer.

pub mod boolean;
pub mod date;
pub mod list;
pub mod numeric;
pub mod text;
