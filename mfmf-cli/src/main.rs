//! mfmf -- multi-file multi-filter log scanner.
//!
//! Configuration precedence, highest first: CLI flags, `MFMF_*` environment
//! variables, the `--config` TOML file, built-in defaults.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use mfmf_core::config::MfmfConfig;
use mfmf_core::types::{OutputFormat, PredicateMode};
use mfmf_log_filter::ScannerConfig;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::OutputWriter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "mfmf failed");
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = MfmfConfig::load_or_default(cli.config.as_deref())?;
    apply_cli_overrides(&cli, &mut config);
    config.validate()?;

    logging::init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_dir = %cli.config_dir.display(),
        "mfmf starting"
    );

    let mut scanner_config = ScannerConfig::from_core(&config.filter, &cli.config_dir)?;
    scanner_config.preprocessor_plugin = cli.preprocessor_plugin.clone();

    let format = OutputFormat::from_name(&config.filter.output_format).unwrap_or_default();

    if cli.list_rules {
        return commands::rules::execute(scanner_config, &OutputWriter::new(format));
    }

    let root = cli
        .log_folder
        .as_deref()
        .ok_or_else(|| CliError::Command("--logFolderPath is required".to_owned()))?;
    commands::scan::execute(root, scanner_config, cli.output_file.as_deref(), format)?;

    Ok(())
}

/// Apply CLI flags on top of the file and environment layers.
fn apply_cli_overrides(cli: &Cli, config: &mut MfmfConfig) {
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(path) = &cli.log_file {
        config.general.log_file = path.display().to_string();
    }
    // -e can only turn predicate execution on
    if cli.exec_script {
        config.filter.exec_script = true;
    }
    if let Some(mode) = cli.predicate_mode {
        config.filter.predicate_mode = PredicateMode::from(mode).as_str().to_owned();
    }
    if let Some(format) = cli.format {
        config.filter.output_format = OutputFormat::from(format).to_string();
    }
}
