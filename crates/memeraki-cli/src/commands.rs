use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use memeraki_core::{BatchCommitter, UploadPipeline};
use memeraki_ingest::CsvSource;
use memeraki_model::{PipelineKind, RunSummary};
use memeraki_store::{
    Credential, DocumentStore, EMULATOR_HOST_ENV, FirestoreStore, InMemoryStore,
};

use crate::cli::UploadArgs;
use crate::config::{UploadSettings, UploaderConfig};
use crate::reporter::build_reporter;
use crate::summary::schema_table;

/// Process exit code when the run finished but some batches failed.
pub const EXIT_BATCH_FAILURES: i32 = 2;

/// Result of a completed upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub csv: PathBuf,
    pub collection: String,
    pub dry_run: bool,
    pub summary: RunSummary,
}

impl UploadOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.summary.has_batch_failures() {
            EXIT_BATCH_FAILURES
        } else {
            0
        }
    }
}

/// How progress is shown for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json_logs: bool,
    pub logs_to_file: bool,
    pub log_data: bool,
}

pub fn run_schema(pipeline: PipelineKind) -> Result<()> {
    let schema = pipeline.schema();
    println!(
        "{} schema (collection '{}', id from {})",
        pipeline.label(),
        pipeline.default_collection(),
        schema.natural_key.join(" + ")
    );
    println!("{}", schema_table(schema));
    Ok(())
}

pub fn run_upload(
    pipeline: PipelineKind,
    args: &UploadArgs,
    config: &UploaderConfig,
    output: OutputOptions,
) -> Result<UploadOutcome> {
    let emulator_env = std::env::var(EMULATOR_HOST_ENV)
        .ok()
        .filter(|host| !host.trim().is_empty());
    let settings = UploadSettings::resolve(pipeline, args, config, emulator_env)?;

    let source = CsvSource::new(&settings.csv).with_delimiter(settings.delimiter);
    let show_bar = !args.no_progress && !output.json_logs && io::stderr().is_terminal();
    let upload = UploadPipeline::new(pipeline)
        .with_collection(settings.collection.clone())
        .with_id_strategy(settings.id_strategy)
        .with_row_count(show_bar);
    let mut reporter = build_reporter(
        output.json_logs,
        output.logs_to_file,
        show_bar,
        output.log_data,
    );

    let store = open_store(&settings)?;
    let mut committer = BatchCommitter::new(store, settings.committer)?;
    let summary = upload
        .run(&source, &mut committer, &mut reporter)
        .with_context(|| format!("upload {} failed", settings.csv.display()))?;

    Ok(UploadOutcome {
        csv: settings.csv,
        collection: settings.collection,
        dry_run: settings.dry_run,
        summary,
    })
}

fn open_store(settings: &UploadSettings) -> Result<Box<dyn DocumentStore>> {
    if settings.dry_run {
        info!("dry run: documents are validated and mapped but not written");
        return Ok(Box::new(InMemoryStore::new()));
    }

    let credential = load_credential(settings)?;
    let store = match &settings.emulator_host {
        Some(host) => {
            info!(%host, "using Firestore emulator");
            FirestoreStore::emulator(credential, host)?
        }
        None => FirestoreStore::new(credential)?,
    };
    Ok(Box::new(store))
}

fn load_credential(settings: &UploadSettings) -> Result<Credential> {
    let credential = match (&settings.emulator_host, &settings.credentials) {
        (Some(_), None) => {
            let project = settings
                .project_id
                .clone()
                .context("emulator uploads need a project id")?;
            Credential::emulator(project)
        }
        (Some(_), Some(path)) => match &settings.project_id {
            Some(project) => Credential::emulator(project.clone()),
            None => Credential::load_for_emulator(path)
                .with_context(|| format!("load credential {}", path.display()))?,
        },
        (None, Some(path)) => Credential::load(path)
            .with_context(|| format!("load credential {}", path.display()))?,
        (None, None) => anyhow::bail!("no credential file given"),
    };
    Ok(match &settings.database {
        Some(database) => credential.with_database(database.clone()),
        None => credential,
    })
}
