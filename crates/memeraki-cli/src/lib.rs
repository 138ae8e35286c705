//! Memeraki uploader CLI library: argument definitions, configuration,
//! logging and terminal output used by the `memeraki-uploader` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod reporter;
pub mod summary;
