//! Logging initialization for mfmf.
//!
//! Configures `tracing-subscriber` based on the `[general]` section
//! of `MfmfConfig`. The diagnostic log goes to stderr or to `log_file`,
//! never to the match record stream.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mfmf_core::config::GeneralConfig;

use crate::error::CliError;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable output (default)
pub fn init_tracing(config: &GeneralConfig) -> Result<(), CliError> {
    let env_filter = EnvFilter::try_new(&config.log_level).map_err(|e| {
        CliError::Config(format!("invalid log level '{}': {}", config.log_level, e))
    })?;

    let (writer, ansi) = make_writer(&config.log_file)?;

    match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()
            .map_err(|e| {
                CliError::Command(format!("failed to initialize JSON tracing subscriber: {e}"))
            })?,
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()
            .map_err(|e| {
                CliError::Command(format!("failed to initialize pretty tracing subscriber: {e}"))
            })?,
        other => {
            return Err(CliError::Config(format!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            )));
        }
    }

    Ok(())
}

/// stderr for an empty path, otherwise the file opened for appending.
fn make_writer(log_file: &str) -> Result<(BoxMakeWriter, bool), CliError> {
    if log_file.is_empty() {
        return Ok((BoxMakeWriter::new(std::io::stderr), true));
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    Ok((BoxMakeWriter::new(Mutex::new(file)), false))
}
