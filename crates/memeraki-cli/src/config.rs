//! Uploader configuration: optional TOML file merged with command-line flags.
//!
//! ```toml
//! [store]
//! credentials = "secrets/service-account.json"
//! database = "(default)"
//!
//! [processing]
//! batch_size = 400
//! retry_attempts = 3
//!
//! [artists]
//! csv = "exports/artists.csv"
//!
//! [artforms]
//! csv = "exports/artforms.csv"
//! collection = "artforms_staging"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use memeraki_core::CommitterConfig;
use memeraki_model::PipelineKind;
use memeraki_store::RetryPolicy;
use memeraki_transform::IdStrategy;
use serde::Deserialize;

use crate::cli::UploadArgs;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MEMERAKI_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploaderConfig {
    pub store: StoreSection,
    pub processing: ProcessingSection,
    pub artists: PipelineSection,
    pub artforms: PipelineSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub credentials: Option<PathBuf>,
    pub project_id: Option<String>,
    pub database: Option<String>,
    /// `host:port` of a local Firestore emulator.
    pub emulator_host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingSection {
    pub batch_size: usize,
    pub retry_attempts: u32,
    pub retry_min_wait_secs: u64,
    pub retry_max_wait_secs: u64,
    pub batch_delay_ms: u64,
    pub id_strategy: IdStrategy,
    pub delimiter: char,
}

impl Default for ProcessingSection {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            batch_size: memeraki_core::DEFAULT_BATCH_SIZE,
            retry_attempts: retry.max_attempts,
            retry_min_wait_secs: retry.min_wait.as_secs(),
            retry_max_wait_secs: retry.max_wait.as_secs(),
            batch_delay_ms: 0,
            id_strategy: IdStrategy::default(),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    pub csv: Option<PathBuf>,
    pub collection: Option<String>,
}

impl UploaderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parse config file {}", path.display()))
    }

    /// Load `explicit`, else the file named by `env_path`, else defaults.
    pub fn discover(explicit: Option<&Path>, env_path: Option<PathBuf>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn pipeline(&self, pipeline: PipelineKind) -> &PipelineSection {
        match pipeline {
            PipelineKind::Artists => &self.artists,
            PipelineKind::Artforms => &self.artforms,
        }
    }
}

/// Everything an upload run needs, after merging flags over the config file.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub pipeline: PipelineKind,
    pub csv: PathBuf,
    pub collection: String,
    pub credentials: Option<PathBuf>,
    pub project_id: Option<String>,
    pub database: Option<String>,
    pub emulator_host: Option<String>,
    pub committer: CommitterConfig,
    pub id_strategy: IdStrategy,
    pub delimiter: u8,
    pub dry_run: bool,
}

impl UploadSettings {
    /// Merge flags over config values and validate the result.
    ///
    /// `emulator_host` is the value of the emulator environment variable,
    /// used when the config file does not name one.
    pub fn resolve(
        pipeline: PipelineKind,
        args: &UploadArgs,
        config: &UploaderConfig,
        emulator_host: Option<String>,
    ) -> Result<Self> {
        let section = config.pipeline(pipeline);
        let processing = &config.processing;

        let Some(csv) = args.csv.clone().or_else(|| section.csv.clone()) else {
            bail!(
                "no CSV file given; pass one on the command line or set `csv` under [{}]",
                pipeline.default_collection()
            );
        };

        let collection = args
            .collection
            .clone()
            .or_else(|| section.collection.clone())
            .unwrap_or_else(|| pipeline.default_collection().to_string());
        if collection.trim().is_empty() || collection.contains('/') {
            bail!("invalid collection name {collection:?}");
        }

        let delimiter = args.delimiter.unwrap_or(processing.delimiter);
        if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
            bail!("delimiter must be a single ASCII character other than quote or newline");
        }

        let retry = RetryPolicy {
            max_attempts: args.retry_attempts.unwrap_or(processing.retry_attempts).max(1),
            min_wait: Duration::from_secs(processing.retry_min_wait_secs),
            max_wait: Duration::from_secs(processing.retry_max_wait_secs),
        };
        if retry.min_wait > retry.max_wait {
            bail!("retry_min_wait_secs must not exceed retry_max_wait_secs");
        }
        let committer = CommitterConfig::default()
            .with_batch_size(args.batch_size.unwrap_or(processing.batch_size))
            .with_retry(retry)
            .with_batch_delay(Duration::from_millis(
                args.batch_delay_ms.unwrap_or(processing.batch_delay_ms),
            ));
        committer.validate()?;

        let credentials = args
            .credentials
            .clone()
            .or_else(|| config.store.credentials.clone());
        let emulator_host = config.store.emulator_host.clone().or(emulator_host);
        let project_id = args
            .project_id
            .clone()
            .or_else(|| config.store.project_id.clone());
        if !args.dry_run {
            match &emulator_host {
                Some(_) if credentials.is_none() && project_id.is_none() => {
                    bail!("emulator uploads need --project-id or a credential file")
                }
                None if credentials.is_none() => bail!(
                    "no credential file given; pass --credentials or set `credentials` under [store]"
                ),
                _ => {}
            }
        }

        Ok(Self {
            pipeline,
            csv,
            collection,
            credentials,
            project_id,
            database: config.store.database.clone(),
            emulator_host,
            committer,
            id_strategy: args
                .id_strategy
                .map_or(processing.id_strategy, IdStrategy::from),
            delimiter: delimiter as u8,
            dry_run: args.dry_run,
        })
    }
}
