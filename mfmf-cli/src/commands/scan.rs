//! `mfmf -l <DIR>` scan handler

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use mfmf_core::types::OutputFormat;
use mfmf_log_filter::{RecordWriter, ScanSummary, Scanner, ScannerConfig};

use crate::error::CliError;

/// Load the rule files and scan `root`, streaming match records to
/// `output_file` or stdout.
pub fn execute(
    root: &Path,
    config: ScannerConfig,
    output_file: Option<&Path>,
    format: OutputFormat,
) -> Result<ScanSummary, CliError> {
    let scanner = Scanner::load(config)?;

    let summary = match output_file {
        Some(path) => {
            info!(output = %path.display(), format = %format, "writing records to file");
            let file = File::create(path)?;
            scan_into(&scanner, root, file, format)?
        }
        None => {
            let stdout = std::io::stdout();
            scan_into(&scanner, root, stdout.lock(), format)?
        }
    };

    Ok(summary)
}

/// Run the scanner with a [`RecordWriter`] over `out`.
pub fn scan_into<W: Write>(
    scanner: &Scanner,
    root: &Path,
    out: W,
    format: OutputFormat,
) -> Result<ScanSummary, CliError> {
    let mut writer = RecordWriter::new(out, format);
    let summary = scanner.run(root, &mut writer)?;
    writer.into_inner()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use mfmf_log_filter::ScannerConfigBuilder;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().expect("should create temp dir");
        let rules = dir.path().join("rules");
        let logs = dir.path().join("logs");
        fs::create_dir_all(&rules).expect("create rules dir");
        fs::create_dir_all(&logs).expect("create logs dir");

        fs::write(
            rules.join("allowed_file_list.csv"),
            "rule_enable,rule_name,is_case_senstive,file_basename_regexp\n\
             true,logs,true,.*\\.log$\n",
        )
        .expect("write allow list");
        fs::write(
            rules.join("pattern_config.csv"),
            "pattern_enable,pattern_name,is_case_senstive,regexp_pattern,exec_filter_enable,exec_filter_script\n\
             true,error,true,ERROR,false,\n",
        )
        .expect("write patterns");
        fs::write(logs.join("app.log"), "ok\nERROR disk full\n").expect("write log");
        fs::write(logs.join("notes.txt"), "ERROR ignored\n").expect("write txt");
        dir
    }

    fn scanner(dir: &TempDir) -> Scanner {
        let config = ScannerConfigBuilder::new()
            .rule_dir(dir.path().join("rules"))
            .build()
            .expect("config should build");
        Scanner::load(config).expect("rules should load")
    }

    #[test]
    fn test_scan_into_writes_json_lines() {
        let dir = fixture();
        let scanner = scanner(&dir);

        let mut out = Vec::new();
        let summary = scan_into(&scanner, &dir.path().join("logs"), &mut out, OutputFormat::Json)
            .expect("scan should succeed");

        assert_eq!(summary.records, 1);
        assert_eq!(summary.files_not_allowed, 1);

        let text = String::from_utf8(out).expect("valid UTF-8");
        let record: serde_json::Value =
            serde_json::from_str(text.trim_end()).expect("one JSON record");
        assert_eq!(record["line_text"], "ERROR disk full");
        assert_eq!(record["matched_rule_index"], 0);
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = fixture();
        let output = dir.path().join("out.txt");
        let config = ScannerConfigBuilder::new()
            .rule_dir(dir.path().join("rules"))
            .build()
            .expect("config should build");

        let summary = execute(
            &dir.path().join("logs"),
            config,
            Some(&output),
            OutputFormat::Text,
        )
        .expect("scan should succeed");
        assert_eq!(summary.records, 1);

        let text = fs::read_to_string(&output).expect("output file exists");
        assert!(text.ends_with(":0: ERROR disk full\n"), "got {text:?}");
        assert!(text.contains("app.log"));
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = fixture();
        let scanner = scanner(&dir);

        let err = scan_into(
            &scanner,
            &dir.path().join("does-not-exist"),
            Vec::new(),
            OutputFormat::Json,
        )
        .expect_err("missing root should fail");
        assert_eq!(err.exit_code(), 10);
    }
}
