//! 스캐너 설정
//!
//! [`ScannerConfig`]는 core의 [`FilterConfig`](mfmf_core::config::FilterConfig)를
//! 기반으로 문자열 설정값을 타입이 있는 값으로 변환한 실행 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use mfmf_core::config::MfmfConfig;
//! use mfmf_log_filter::config::ScannerConfig;
//!
//! let core_config = MfmfConfig::default();
//! let config = ScannerConfig::from_core(&core_config.filter, "/etc/mfmf")?;
//! ```

use std::path::{Path, PathBuf};

use mfmf_core::config::FilterConfig;
use mfmf_core::types::{Encoding, PredicateMode};

use crate::error::LogFilterError;
use crate::predicate::PredicateOptions;

/// 스캐너 실행 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// 규칙 파일 디렉토리
    pub rule_dir: PathBuf,
    /// 라인 규칙 파일명
    pub pattern_file: String,
    /// 허용 basename 규칙 파일명
    pub allow_file: String,
    /// 차단 basename 규칙 파일명
    pub block_file: String,
    /// 술어 실행 전역 허용 여부
    pub exec_script: bool,
    /// 술어 엔진 옵션
    pub predicate: PredicateOptions,
    /// 디코딩 시도 순서
    pub encodings: Vec<Encoding>,
    /// 전처리 플러그인 경로 (예약, 사용하지 않음)
    pub preprocessor_plugin: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let core = FilterConfig::default();
        Self {
            rule_dir: PathBuf::from("."),
            pattern_file: core.pattern_file,
            allow_file: core.allow_file,
            block_file: core.block_file,
            exec_script: core.exec_script,
            predicate: PredicateOptions::default(),
            encodings: vec![Encoding::Utf8, Encoding::Latin1],
            preprocessor_plugin: None,
        }
    }
}

impl ScannerConfig {
    /// core의 `FilterConfig`에서 스캐너 설정을 생성합니다.
    ///
    /// # Errors
    /// 알 수 없는 술어 모드나 인코딩 이름이 있는 경우
    pub fn from_core(core: &FilterConfig, rule_dir: impl AsRef<Path>) -> Result<Self, LogFilterError> {
        let mode = PredicateMode::from_name(&core.predicate_mode).ok_or_else(|| {
            LogFilterError::Config {
                field: "predicate_mode".to_owned(),
                reason: format!("unknown predicate mode '{}'", core.predicate_mode),
            }
        })?;

        let encodings = core
            .encodings
            .iter()
            .map(|name| {
                Encoding::from_name(name).ok_or_else(|| LogFilterError::Config {
                    field: "encodings".to_owned(),
                    reason: format!("unknown encoding '{name}'"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self {
            rule_dir: rule_dir.as_ref().to_path_buf(),
            pattern_file: core.pattern_file.clone(),
            allow_file: core.allow_file.clone(),
            block_file: core.block_file.clone(),
            exec_script: core.exec_script,
            predicate: PredicateOptions {
                mode,
                shell: core.shell.clone(),
            },
            encodings,
            preprocessor_plugin: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// 라인 규칙 파일 경로
    pub fn pattern_path(&self) -> PathBuf {
        self.rule_dir.join(&self.pattern_file)
    }

    /// 허용 목록 파일 경로
    pub fn allow_path(&self) -> PathBuf {
        self.rule_dir.join(&self.allow_file)
    }

    /// 차단 목록 파일 경로
    pub fn block_path(&self) -> PathBuf {
        self.rule_dir.join(&self.block_file)
    }

    /// 설정을 검증합니다.
    pub fn validate(&self) -> Result<(), LogFilterError> {
        if self.encodings.is_empty() {
            return Err(LogFilterError::Config {
                field: "encodings".to_owned(),
                reason: "at least one encoding must be configured".to_owned(),
            });
        }

        for (field, value) in [
            ("pattern_file", &self.pattern_file),
            ("allow_file", &self.allow_file),
            ("block_file", &self.block_file),
        ] {
            if value.is_empty() {
                return Err(LogFilterError::Config {
                    field: field.to_owned(),
                    reason: "rule file name must not be empty".to_owned(),
                });
            }
        }

        if self.predicate.mode == PredicateMode::Shell && self.predicate.shell.is_empty() {
            return Err(LogFilterError::Config {
                field: "shell".to_owned(),
                reason: "shell must not be empty when predicate_mode is 'shell'".to_owned(),
            });
        }

        Ok(())
    }
}

/// 스캐너 설정 빌더
#[derive(Default)]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl ScannerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 빌더를 시작합니다.
    pub fn from_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// 규칙 파일 디렉토리를 설정합니다.
    pub fn rule_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.rule_dir = dir.into();
        self
    }

    /// 술어 실행 전역 허용 여부를 설정합니다.
    pub fn exec_script(mut self, enabled: bool) -> Self {
        self.config.exec_script = enabled;
        self
    }

    /// 술어 실행 모드를 설정합니다.
    pub fn predicate_mode(mut self, mode: PredicateMode) -> Self {
        self.config.predicate.mode = mode;
        self
    }

    /// shell 모드 셸 경로를 설정합니다.
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.config.predicate.shell = shell.into();
        self
    }

    /// 디코딩 시도 순서를 설정합니다.
    pub fn encodings(mut self, encodings: Vec<Encoding>) -> Self {
        self.config.encodings = encodings;
        self
    }

    /// 전처리 플러그인 경로를 설정합니다.
    pub fn preprocessor_plugin(mut self, path: Option<PathBuf>) -> Self {
        self.config.preprocessor_plugin = path;
        self
    }

    /// 설정을 검증하고 `ScannerConfig`를 생성합니다.
    pub fn build(self) -> Result<ScannerConfig, LogFilterError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
