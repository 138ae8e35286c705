//! Memeraki artist and artform uploader.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use memeraki_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use memeraki_cli::commands::{OutputOptions, run_schema, run_upload};
use memeraki_cli::config::{CONFIG_ENV, UploaderConfig};
use memeraki_cli::logging::{LogConfig, LogFormat, init_logging};
use memeraki_cli::summary::print_summary;
use memeraki_model::PipelineKind;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let output = OutputOptions {
        json_logs: log_config.format == LogFormat::Json,
        logs_to_file: !log_config.writes_to_stderr(),
        log_data: cli.log_data,
    };

    let exit_code = match &cli.command {
        Command::Artists(args) => upload(PipelineKind::Artists, args, &cli, output),
        Command::Artforms(args) => upload(PipelineKind::Artforms, args, &cli, output),
        Command::Schema { pipeline } => match run_schema((*pipeline).into()) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn upload(
    pipeline: PipelineKind,
    args: &memeraki_cli::cli::UploadArgs,
    cli: &Cli,
    output: OutputOptions,
) -> i32 {
    let env_config = std::env::var_os(CONFIG_ENV).map(Into::into);
    let result = UploaderConfig::discover(cli.config.as_deref(), env_config)
        .and_then(|config| run_upload(pipeline, args, &config, output));
    match result {
        Ok(outcome) => {
            print_summary(&outcome);
            outcome.exit_code()
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        log_data: cli.log_data,
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_timestamps = cli.log_file.is_some();
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
