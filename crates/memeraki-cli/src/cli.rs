//! Command-line arguments for the uploader.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use memeraki_model::PipelineKind;
use memeraki_transform::IdStrategy;

#[derive(Parser)]
#[command(
    name = "memeraki-uploader",
    version,
    about = "Upload Memeraki artists and artforms from CSV into Firestore",
    long_about = "Read a CSV export, validate every row against the pipeline schema, and \
                  write the rows as documents into the `artists` or `artforms` collection.\n\n\
                  Document ids are derived from the `slug` column, so re-running an upload \
                  overwrites the same documents instead of duplicating them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include raw cell values in rejection messages and logs.
    ///
    /// Artist rows carry phone numbers and bank details; leave this off
    /// unless you are debugging a specific file.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Configuration file (defaults to $MEMERAKI_CONFIG when set).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload an artists CSV into the artists collection.
    Artists(UploadArgs),

    /// Upload an artforms CSV into the artforms collection.
    Artforms(UploadArgs),

    /// Print the column schema of a pipeline.
    Schema {
        #[arg(value_enum)]
        pipeline: PipelineArg,
    },
}

#[derive(Parser, Debug, Default, Clone)]
pub struct UploadArgs {
    /// CSV file to upload (overrides the file named in the config).
    #[arg(value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Service account JSON file with `project_id` and an access token.
    #[arg(long = "credentials", value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Project id, required when talking to an emulator without a credential file.
    #[arg(long = "project-id", value_name = "ID")]
    pub project_id: Option<String>,

    /// Target collection (defaults to the pipeline name).
    #[arg(long = "collection", value_name = "NAME")]
    pub collection: Option<String>,

    /// Documents per commit, 1 to 500.
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Attempts per batch for transient store errors (1 disables retries).
    #[arg(long = "retry-attempts", value_name = "N")]
    pub retry_attempts: Option<u32>,

    /// Pause after each full batch, in milliseconds.
    #[arg(long = "batch-delay-ms", value_name = "MS")]
    pub batch_delay_ms: Option<u64>,

    /// How document ids are derived from the slug.
    #[arg(long = "id-strategy", value_enum)]
    pub id_strategy: Option<IdStrategyArg>,

    /// Field delimiter of the CSV file.
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Validate and map every row without writing to the store.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Do not draw a progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PipelineArg {
    Artists,
    Artforms,
}

impl From<PipelineArg> for PipelineKind {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::Artists => PipelineKind::Artists,
            PipelineArg::Artforms => PipelineKind::Artforms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum IdStrategyArg {
    /// The slug column as written (default).
    Verbatim,
    /// Lowercased, punctuation collapsed to `-`.
    Slug,
    /// Truncated SHA-256 of the slug.
    Hash,
}

impl From<IdStrategyArg> for IdStrategy {
    fn from(arg: IdStrategyArg) -> Self {
        match arg {
            IdStrategyArg::Verbatim => IdStrategy::Verbatim,
            IdStrategyArg::Slug => IdStrategy::Slug,
            IdStrategyArg::Hash => IdStrategy::Hash,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
