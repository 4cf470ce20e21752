//! CLI-specific error types and exit code mapping

use mfmf_core::error::{MfmfError, ScanError};
use mfmf_log_filter::LogFilterError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A rule file could not be loaded or compiled.
    #[error("rule error: {0}")]
    Rule(String),

    /// A command-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (walk, file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration or rule file error          |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Rule(_) => 2,
            Self::Io(_) => 10,
            Self::Command(_) | Self::JsonSerialize(_) => 1,
        }
    }
}

impl From<MfmfError> for CliError {
    fn from(e: MfmfError) -> Self {
        match e {
            MfmfError::Config(e) => Self::Config(e.to_string()),
            MfmfError::Rule(e) => Self::Rule(e.to_string()),
            MfmfError::Scan(ScanError::Walk(reason)) => {
                Self::Io(std::io::Error::other(format!("walk failed: {reason}")))
            }
            MfmfError::Scan(ScanError::Output(reason)) => {
                Self::Command(format!("output failed: {reason}"))
            }
            MfmfError::Io(e) => Self::Io(e),
        }
    }
}

impl From<LogFilterError> for CliError {
    fn from(e: LogFilterError) -> Self {
        MfmfError::from(e).into()
    }
}
