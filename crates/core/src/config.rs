//! 설정 관리 -- mfmf.toml 파싱 및 런타임 설정
//!
//! [`MfmfConfig`]는 로깅과 필터 실행 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선, `mfmf-cli`에서 적용)
//! 2. 환경변수 (`MFMF_FILTER_EXEC_SCRIPT=true` 형식)
//! 3. 설정 파일 (`mfmf.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), mfmf_core::error::MfmfError> {
//! use mfmf_core::config::MfmfConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = MfmfConfig::load("mfmf.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = MfmfConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, MfmfError};

/// 허용되는 로그 레벨
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
/// 허용되는 진단 로그 형식
pub const LOG_FORMATS: &[&str] = &["json", "pretty"];
/// 허용되는 술어 실행 모드
pub const PREDICATE_MODES: &[&str] = &["expr", "shell"];
/// 허용되는 텍스트 인코딩 이름
pub const ENCODING_NAMES: &[&str] = &["utf-8", "latin-1", "ascii"];
/// 허용되는 매칭 레코드 출력 형식
pub const OUTPUT_FORMATS: &[&str] = &["json", "text"];

/// mfmf 통합 설정
///
/// `mfmf.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MfmfConfig {
    /// 일반 설정 (진단 로그)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 필터 실행 설정
    #[serde(default)]
    pub filter: FilterConfig,
}

impl MfmfConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MfmfError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 경로가 주어지면 파일을, 아니면 기본값을 사용합니다.
    ///
    /// 두 경우 모두 환경변수 오버라이드와 유효성 검증을 거칩니다.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, MfmfError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MfmfError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MfmfError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                MfmfError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, MfmfError> {
        toml::from_str(toml_str).map_err(|e| {
            MfmfError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `MFMF_{SECTION}_{FIELD}`
    /// 예: `MFMF_FILTER_PREDICATE_MODE=shell`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "MFMF_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "MFMF_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.log_file, "MFMF_GENERAL_LOG_FILE");

        // Filter
        override_string(&mut self.filter.pattern_file, "MFMF_FILTER_PATTERN_FILE");
        override_string(&mut self.filter.allow_file, "MFMF_FILTER_ALLOW_FILE");
        override_string(&mut self.filter.block_file, "MFMF_FILTER_BLOCK_FILE");
        override_bool(&mut self.filter.exec_script, "MFMF_FILTER_EXEC_SCRIPT");
        override_string(
            &mut self.filter.predicate_mode,
            "MFMF_FILTER_PREDICATE_MODE",
        );
        override_string(&mut self.filter.shell, "MFMF_FILTER_SHELL");
        override_csv(&mut self.filter.encodings, "MFMF_FILTER_ENCODINGS");
        override_string(&mut self.filter.output_format, "MFMF_FILTER_OUTPUT_FORMAT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MfmfError> {
        check_one_of("general.log_level", &self.general.log_level, LOG_LEVELS)?;
        check_one_of("general.log_format", &self.general.log_format, LOG_FORMATS)?;
        check_one_of(
            "filter.predicate_mode",
            &self.filter.predicate_mode,
            PREDICATE_MODES,
        )?;
        check_one_of(
            "filter.output_format",
            &self.filter.output_format,
            OUTPUT_FORMATS,
        )?;

        for (field, value) in [
            ("filter.pattern_file", &self.filter.pattern_file),
            ("filter.allow_file", &self.filter.allow_file),
            ("filter.block_file", &self.filter.block_file),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "rule file name must not be empty".to_owned(),
                }
                .into());
            }
        }

        if self.filter.encodings.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "filter.encodings".to_owned(),
                reason: "at least one encoding must be configured".to_owned(),
            }
            .into());
        }
        for encoding in &self.filter.encodings {
            check_one_of("filter.encodings", encoding, ENCODING_NAMES)?;
        }

        // shell 모드에서는 셸 경로가 필요
        if self.filter.predicate_mode == "shell" && self.filter.shell.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "filter.shell".to_owned(),
                reason: "shell must not be empty when predicate_mode is 'shell'".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 진단 로그 파일 경로 (빈 문자열이면 stderr)
    pub log_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            log_file: String::new(),
        }
    }
}

/// 필터 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 라인 규칙 파일명 (설정 디렉토리 기준)
    pub pattern_file: String,
    /// 허용 basename 규칙 파일명
    pub allow_file: String,
    /// 차단 basename 규칙 파일명
    pub block_file: String,
    /// 술어 실행 전역 허용 여부 (위험: 규칙 파일의 스크립트가 실행됨)
    pub exec_script: bool,
    /// 술어 실행 모드 (expr, shell)
    pub predicate_mode: String,
    /// shell 모드에서 사용할 셸 경로
    pub shell: String,
    /// 시도할 인코딩 순서 (첫 항목이 기본 인코딩)
    pub encodings: Vec<String>,
    /// 매칭 레코드 출력 형식 (json, text)
    pub output_format: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            pattern_file: "pattern_config.csv".to_owned(),
            allow_file: "allowed_file_list.csv".to_owned(),
            block_file: "blocked_file_list.csv".to_owned(),
            exec_script: false,
            predicate_mode: "expr".to_owned(),
            shell: "/bin/sh".to_owned(),
            encodings: vec!["utf-8".to_owned(), "latin-1".to_owned()],
            output_format: "json".to_owned(),
        }
    }
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), MfmfError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: format!("'{value}' must be one of: {}", allowed.join(", ")),
    }
    .into())
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
