//! mfmf.toml 통합 설정 테스트
//!
//! - mfmf.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use mfmf_core::config::MfmfConfig;
use mfmf_core::error::{ConfigError, MfmfError};

// =============================================================================
// mfmf.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../mfmf.toml.example");
    let config = MfmfConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert!(config.general.log_file.is_empty());
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../mfmf.toml.example");
    let config = MfmfConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_keeps_predicates_off() {
    let content = include_str!("../../../mfmf.toml.example");
    let config = MfmfConfig::parse(content).expect("should parse");

    assert!(!config.filter.exec_script);
    assert_eq!(config.filter.predicate_mode, "expr");
    assert_eq!(config.filter.encodings, vec!["utf-8", "latin-1"]);
}

// =============================================================================
// 파일 로딩
// =============================================================================

#[test]
#[serial]
fn load_from_file_applies_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("mfmf.toml");
    fs::write(
        &config_path,
        r#"
[general]
log_level = "debug"

[filter]
pattern_file = "lines.csv"
output_format = "text"
"#,
    )
    .expect("should write config");

    let config = MfmfConfig::load(&config_path).expect("config should load");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.filter.pattern_file, "lines.csv");
    assert_eq!(config.filter.output_format, "text");
    // 지정하지 않은 필드는 기본값
    assert_eq!(config.filter.allow_file, "allowed_file_list.csv");
}

#[test]
#[serial]
fn env_override_beats_file_value() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("mfmf.toml");
    fs::write(&config_path, "[filter]\npredicate_mode = \"expr\"\n").expect("should write");

    // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 읽지 않습니다.
    unsafe { std::env::set_var("MFMF_FILTER_PREDICATE_MODE", "shell") };
    let result = MfmfConfig::load(&config_path);
    unsafe { std::env::remove_var("MFMF_FILTER_PREDICATE_MODE") };

    let config = result.expect("config should load");
    assert_eq!(config.filter.predicate_mode, "shell");
}

#[test]
#[serial]
fn env_override_is_validated() {
    // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 읽지 않습니다.
    unsafe { std::env::set_var("MFMF_FILTER_ENCODINGS", "utf-8,klingon") };
    let result = MfmfConfig::load_or_default(None);
    unsafe { std::env::remove_var("MFMF_FILTER_ENCODINGS") };

    let err = result.expect_err("unknown encoding should be rejected");
    assert!(matches!(
        err,
        MfmfError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[test]
#[serial]
fn load_or_default_without_path_uses_defaults() {
    let config = MfmfConfig::load_or_default(None).expect("defaults should load");
    assert_eq!(config.filter.pattern_file, "pattern_config.csv");
}

// =============================================================================
// 에러 케이스
// =============================================================================

#[test]
fn empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");
    fs::write(&config_path, "").expect("should write empty file");

    let config = MfmfConfig::from_file(&config_path).expect("empty config should load");
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn malformed_file_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write");

    let result = MfmfConfig::from_file(&config_path);
    assert!(matches!(
        result,
        Err(MfmfError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn wrong_value_type_fails() {
    let result = MfmfConfig::parse("[filter]\nexec_script = \"maybe\"\n");
    assert!(result.is_err(), "string for bool field should fail");
}
