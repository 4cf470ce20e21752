//! 통합 테스트 -- 규칙 파일 로딩부터 레코드 출력까지의 전체 스캔 흐름 검증

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use mfmf_core::types::{Encoding, MatchRecord, OutputFormat, PredicateMode};
use mfmf_log_filter::{
    LogFilterError, RecordWriter, ScanSummary, Scanner, ScannerConfigBuilder,
};

const BASENAME_HEADER: &str = "rule_enable,rule_name,is_case_senstive,file_basename_regexp\n";
const LINE_HEADER: &str = "pattern_enable,pattern_name,is_case_senstive,regexp_pattern,exec_filter_enable,exec_filter_script\n";

/// 규칙 디렉토리와 로그 디렉토리를 가진 테스트 픽스처
struct Fixture {
    _temp: TempDir,
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().expect("should create temp dir");
        let config_dir = temp.path().join("config");
        let log_dir = temp.path().join("logs");
        fs::create_dir_all(&config_dir).expect("should create config dir");
        fs::create_dir_all(&log_dir).expect("should create log dir");
        Self {
            _temp: temp,
            config_dir,
            log_dir,
        }
    }

    fn allow(&self, rows: &str) -> &Self {
        self.write_rules("allowed_file_list.csv", BASENAME_HEADER, rows)
    }

    fn block(&self, rows: &str) -> &Self {
        self.write_rules("blocked_file_list.csv", BASENAME_HEADER, rows)
    }

    fn patterns(&self, rows: &str) -> &Self {
        self.write_rules("pattern_config.csv", LINE_HEADER, rows)
    }

    fn write_rules(&self, name: &str, header: &str, rows: &str) -> &Self {
        fs::write(self.config_dir.join(name), format!("{header}{rows}"))
            .expect("should write rule file");
        self
    }

    fn log(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.log_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("should create log subdir");
        }
        fs::write(&path, content).expect("should write log file");
        path
    }

    fn scanner(&self, configure: impl FnOnce(ScannerConfigBuilder) -> ScannerConfigBuilder) -> Scanner {
        let builder = ScannerConfigBuilder::new().rule_dir(&self.config_dir);
        let config = configure(builder).build().expect("config should be valid");
        Scanner::load(config).expect("rules should load")
    }

    fn run(&self, scanner: &Scanner) -> (Vec<MatchRecord>, ScanSummary) {
        let mut records: Vec<MatchRecord> = Vec::new();
        let summary = scanner
            .run(&self.log_dir, &mut records)
            .expect("scan should succeed");
        (records, summary)
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

// =============================================================================
// 기본 시나리오
// =============================================================================

#[test]
fn end_to_end_single_error_line() {
    let fx = Fixture::new();
    fx.allow("true,logs,true,.*\\.log$\n")
        .patterns("true,errors,true,ERROR,false,\n");
    let app_log = fx.log("app.log", b"INFO start\nERROR disk full\n");

    let scanner = fx.scanner(|b| b);
    let (records, summary) = fx.run(&scanner);

    assert_eq!(
        records,
        vec![MatchRecord::new(path_string(&app_log), "ERROR disk full", 0)]
    );
    assert_eq!(summary.files_seen, 1);
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(summary.lines_scanned, 2);
    assert_eq!(summary.records, 1);
}

#[test]
fn block_rule_skips_file_entirely() {
    let fx = Fixture::new();
    fx.allow("true,logs,true,.*\\.log$\n")
        .block("true,app,true,^app\n")
        .patterns("true,errors,true,ERROR,false,\n");
    fx.log("app.log", b"INFO start\nERROR disk full\n");

    let scanner = fx.scanner(|b| b);
    let (records, summary) = fx.run(&scanner);

    assert!(records.is_empty());
    assert_eq!(summary.files_blocked, 1);
    assert_eq!(summary.files_scanned, 0);
}

#[test]
fn allow_list_miss_skips_file() {
    let fx = Fixture::new();
    fx.allow("true,logs,true,.*\\.log$\n")
        .patterns("true,errors,true,ERROR,false,\n");
    fx.log("notes.txt", b"ERROR not a log\n");
    fx.log("archive.log.gz", b"ERROR compressed\n");

    let scanner = fx.scanner(|b| b);
    let (records, summary) = fx.run(&scanner);

    // `.*\.log$`는 접두 고정이지만 `$`로 끝까지 매칭해야 하므로 .gz는 제외
    assert!(records.is_empty());
    assert_eq!(summary.files_not_allowed, 2);
}

#[test]
fn missing_rule_files_yield_empty_sets() {
    let fx = Fixture::new();
    fx.log("app.log", b"ERROR disk full\n");

    let scanner = fx.scanner(|b| b);
    assert!(scanner.block_list().is_empty());
    assert!(scanner.allow_list().is_empty());
    assert!(scanner.line_matcher().is_empty());

    // 허용 목록이 비어 있으면 어떤 파일도 스캔하지 않음
    let (records, summary) = fx.run(&scanner);
    assert!(records.is_empty());
    assert_eq!(summary.files_not_allowed, 1);
}

#[test]
fn nested_directories_are_walked() {
    let fx = Fixture::new();
    fx.allow("true,logs,true,.*\\.log$\n")
        .patterns("true,errors,true,ERROR,false,\n");
    let deep = fx.log("a/b/c/deep.log", b"ERROR deep\n");
    let top = fx.log("top.log", b"ERROR top\n");

    let scanner = fx.scanner(|b| b);
    let (records, summary) = fx.run(&scanner);

    let mut paths: Vec<String> = records.iter().map(|r| r.file_path.clone()).collect();
    paths.sort();
    let mut expected = vec![path_string(&deep), path_string(&top)];
    expected.sort();
    assert_eq!(paths, expected);
    assert_eq!(summary.files_scanned, 2);
}

#[test]
fn records_keep_line_order_within_file() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,warn,true,WARN,false,\ntrue,err,true,ERROR,false,\n");
    fx.log("app.log", b"ERROR first\nINFO skip\nWARN second\nERROR third\n");

    let scanner = fx.scanner(|b| b);
    let (records, _) = fx.run(&scanner);

    let got: Vec<(&str, usize)> = records
        .iter()
        .map(|r| (r.line_text.as_str(), r.matched_rule_index))
        .collect();
    assert_eq!(
        got,
        vec![("ERROR first", 1), ("WARN second", 0), ("ERROR third", 1)]
    );
}

// =============================================================================
// 규칙 의미론
// =============================================================================

#[test]
fn disabled_rows_are_not_numbered() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n").patterns(
        "false,debug,true,DEBUG,false,\ntrue,err,true,ERROR,false,\ntrue,warn,true,WARN,false,\n",
    );
    fx.log("app.log", b"DEBUG x\nERROR y\nWARN z\n");

    let scanner = fx.scanner(|b| b);
    assert_eq!(scanner.line_matcher().len(), 2);

    let (records, _) = fx.run(&scanner);
    let indices: Vec<usize> = records.iter().map(|r| r.matched_rule_index).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn case_insensitive_line_rule() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,err,false,error,false,\n");
    fx.log("app.log", b"ERROR occurred\n");

    let scanner = fx.scanner(|b| b);
    let (records, _) = fx.run(&scanner);
    assert_eq!(records.len(), 1);
}

#[test]
fn invalid_regex_fails_at_load() {
    let fx = Fixture::new();
    fx.patterns("true,bad,true,(unclosed,false,\n");

    let config = ScannerConfigBuilder::new()
        .rule_dir(&fx.config_dir)
        .build()
        .unwrap();
    let err = Scanner::load(config).err().expect("load should fail");
    assert!(matches!(err, LogFilterError::RuleRegex { .. }));
}

#[test]
fn malformed_row_fails_at_load_naming_field() {
    let fx = Fixture::new();
    fx.allow("true,ok,true,.*\ntrue,broken,true\n");

    let config = ScannerConfigBuilder::new()
        .rule_dir(&fx.config_dir)
        .build()
        .unwrap();
    let err = Scanner::load(config).err().expect("load should fail");
    let msg = err.to_string();
    assert!(msg.contains("allowed_file_list.csv"), "{msg}");
    assert!(msg.contains("file_basename_regexp"), "{msg}");
    assert!(msg.contains("row 3"), "{msg}");
}

// =============================================================================
// 술어
// =============================================================================

#[test]
fn predicate_gating_falls_through_to_next_rule() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n").patterns(
        "true,slow,true,latency_ms=(?P<ms>\\d+),true,$ms > 1000\ntrue,any_latency,true,latency_ms,false,\n",
    );
    fx.log("app.log", b"req latency_ms=1500\nreq latency_ms=20\n");

    let scanner = fx.scanner(|b| b.exec_script(true));
    let (records, _) = fx.run(&scanner);

    let indices: Vec<usize> = records.iter().map(|r| r.matched_rule_index).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn predicates_do_not_run_without_global_flag() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,slow,true,latency_ms=(\\d+),true,$1 > 1000\n");
    fx.log("app.log", b"req latency_ms=20\n");

    let scanner = fx.scanner(|b| b.exec_script(false));
    let (records, _) = fx.run(&scanner);
    assert_eq!(records.len(), 1);
}

#[test]
fn bad_predicate_fails_at_load_even_when_flag_is_off() {
    let fx = Fixture::new();
    fx.patterns("true,slow,true,latency=(\\d+),true,$1 >>> 3\n");

    let config = ScannerConfigBuilder::new()
        .rule_dir(&fx.config_dir)
        .exec_script(false)
        .build()
        .unwrap();
    let err = Scanner::load(config).err().expect("load should fail");
    assert!(matches!(err, LogFilterError::PredicateCompile { .. }));
}

#[cfg(unix)]
#[test]
fn shell_predicate_mode() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n").patterns(
        "true,disk,true,disk usage at (\\d+)%,true,\"[ \"\"$MFMF_GROUP_1\"\" -ge 90 ]\"\n",
    );
    fx.log("app.log", b"disk usage at 95%\ndisk usage at 40%\n");

    let scanner = fx.scanner(|b| b.exec_script(true).predicate_mode(PredicateMode::Shell));
    let (records, _) = fx.run(&scanner);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].line_text, "disk usage at 95%");
}

// =============================================================================
// 인코딩 폴백
// =============================================================================

#[test]
fn fallback_decoding_produces_same_records() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,errors,true,ERROR,false,\n");
    let clean = fx.log("clean.log", b"INFO cafe\nERROR disk full\n");
    let latin = fx.log("latin.log", b"INFO caf\xe9\nERROR disk full\n");

    let scanner = fx.scanner(|b| b);
    let (records, summary) = fx.run(&scanner);

    assert_eq!(
        records,
        vec![
            MatchRecord::new(path_string(&clean), "ERROR disk full", 0),
            MatchRecord::new(path_string(&latin), "ERROR disk full", 0),
        ]
    );
    assert_eq!(summary.decode_failures, 1);
    assert_eq!(summary.fallback_decodes, 1);
    assert_eq!(summary.files_failed, 0);
}

#[test]
fn file_invalid_under_every_encoding_yields_nothing() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,errors,true,ERROR,false,\n");
    // 첫 줄은 매칭되지만 둘째 줄의 디코딩 실패로 파일 전체를 건너뜀
    fx.log("bad.log", b"ERROR early\nERROR \xff\xfe\n");
    let good = fx.log("good.log", b"ERROR fine\n");

    let scanner = fx.scanner(|b| b.encodings(vec![Encoding::Utf8, Encoding::Ascii]));
    let (records, summary) = fx.run(&scanner);

    assert_eq!(
        records,
        vec![MatchRecord::new(path_string(&good), "ERROR fine", 0)]
    );
    assert_eq!(summary.decode_failures, 2);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.files_scanned, 1);
}

// =============================================================================
// 출력
// =============================================================================

#[test]
fn json_writer_output() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,errors,true,ERROR,false,\n");
    let app_log = fx.log("app.log", b"ERROR disk full\n");

    let scanner = fx.scanner(|b| b);
    let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Json);
    scanner.run(&fx.log_dir, &mut writer).unwrap();
    let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
    assert_eq!(value["file_path"], path_string(&app_log));
    assert_eq!(value["line_text"], "ERROR disk full");
    assert_eq!(value["matched_rule_index"], 0);
}

#[test]
fn text_writer_output() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,errors,true,ERROR,false,\n");
    let app_log = fx.log("app.log", b"ERROR disk full\n");

    let scanner = fx.scanner(|b| b);
    let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Text);
    scanner.run(&fx.log_dir, &mut writer).unwrap();
    let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    assert_eq!(out, format!("{}:0: ERROR disk full\n", app_log.display()));
}

// =============================================================================
// 순회
// =============================================================================

#[cfg(unix)]
#[test]
fn symlinks_are_not_followed() {
    let fx = Fixture::new();
    fx.allow("true,all,true,.*\n")
        .patterns("true,errors,true,ERROR,false,\n");

    let outside = fx.config_dir.join("outside.log");
    fs::write(&outside, b"ERROR outside\n").unwrap();
    std::os::unix::fs::symlink(&outside, fx.log_dir.join("link.log")).unwrap();

    let scanner = fx.scanner(|b| b);
    let (records, summary) = fx.run(&scanner);
    assert!(records.is_empty());
    assert_eq!(summary.files_seen, 0);
}

#[test]
fn shipped_example_rules_load() {
    let rules = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../rules.example");
    let config = ScannerConfigBuilder::new().rule_dir(rules).build().unwrap();
    let scanner = Scanner::load(config).expect("example rules should load");

    assert!(!scanner.allow_list().is_empty());
    assert!(!scanner.block_list().is_empty());
    assert!(scanner.line_matcher().predicate_count() > 0);
}
