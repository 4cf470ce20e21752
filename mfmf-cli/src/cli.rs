//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mfmf_core::types::{OutputFormat, PredicateMode};

/// mfmf -- multi-file multi-filter log scanner.
///
/// Walks a log directory, gates files by basename rules and prints every line
/// that matches a line rule.
#[derive(Parser, Debug)]
#[command(name = "mfmf", version, about, long_about = None)]
pub struct Cli {
    /// Root directory of the log files to scan.
    #[arg(
        short = 'l',
        long = "logFolderPath",
        value_name = "DIR",
        required_unless_present = "list_rules"
    )]
    pub log_folder: Option<PathBuf>,

    /// Directory holding the block, allow and pattern rule files.
    #[arg(short = 'c', long = "configDirPath", value_name = "DIR")]
    pub config_dir: PathBuf,

    /// DANGER: run the predicates attached to line rules. Shell predicates
    /// execute arbitrary commands from the rule file.
    #[arg(short = 'e', long = "exec_script")]
    pub exec_script: bool,

    /// Preprocessor plugin (reserved, currently ignored).
    #[arg(short = 'p', long = "preprocessorPlugin", value_name = "FILE")]
    pub preprocessor_plugin: Option<PathBuf>,

    /// Path to an mfmf.toml configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write the diagnostic log to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Write match records to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Match record format.
    #[arg(long)]
    pub format: Option<FormatArg>,

    /// Predicate engine used for exec_filter_script.
    #[arg(long)]
    pub predicate_mode: Option<PredicateModeArg>,

    /// Load and print the compiled rule sets, then exit without scanning.
    #[arg(long)]
    pub list_rules: bool,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// JSON Lines, one record per line.
    Json,
    /// `<file_path>:<rule_index>: <line>`
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

/// Supported predicate engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PredicateModeArg {
    /// Built-in expression language.
    Expr,
    /// `sh -c` with captures in the environment.
    Shell,
}

impl From<PredicateModeArg> for PredicateMode {
    fn from(arg: PredicateModeArg) -> Self {
        match arg {
            PredicateModeArg::Expr => PredicateMode::Expr,
            PredicateModeArg::Shell => PredicateMode::Shell,
        }
    }
}
