//! 로그 필터 에러 타입
//!
//! [`LogFilterError`]는 규칙 로딩, 술어 컴파일, 디렉토리 순회, 출력 중
//! 발생하는 모든 에러를 표현합니다.
//! `From<LogFilterError> for MfmfError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use mfmf_core::error::{MfmfError, RuleError, ScanError};

/// 로그 필터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogFilterError {
    /// 규칙 파일 로딩 실패 (읽기 실패, CSV 형식 오류, 크기 초과)
    #[error("rule load error: {path}: {reason}")]
    RuleLoad {
        /// 규칙 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 규칙 행에 필수 필드가 없음
    #[error("rule row error: {path}: row {row}: missing required field '{field}'")]
    RuleRow {
        /// 규칙 파일 경로
        path: String,
        /// 헤더를 1번째 줄로 센 파일 내 줄 번호
        row: u64,
        /// 누락된 필드명
        field: String,
    },

    /// 규칙 정규식 컴파일 실패
    #[error("rule regex error: {path}: rule '{rule}': {reason}")]
    RuleRegex {
        /// 규칙 파일 경로
        path: String,
        /// 규칙 이름
        rule: String,
        /// 컴파일 실패 사유
        reason: String,
    },

    /// 술어 컴파일 실패
    #[error("predicate compile error: rule '{rule}': {reason}")]
    PredicateCompile {
        /// 규칙 이름
        rule: String,
        /// 컴파일 실패 사유
        reason: String,
    },

    /// 알 수 없는 설정 값 (인코딩, 술어 모드, 출력 형식)
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 디렉토리 순회 실패
    #[error("walk error: {path}: {reason}")]
    Walk {
        /// 실패한 경로
        path: String,
        /// 에러 사유
        reason: String,
    },

    /// 레코드 직렬화 실패
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogFilterError> for MfmfError {
    fn from(err: LogFilterError) -> Self {
        match err {
            LogFilterError::RuleLoad { .. } => MfmfError::Rule(RuleError::Load(err.to_string())),
            LogFilterError::RuleRow { .. }
            | LogFilterError::RuleRegex { .. }
            | LogFilterError::PredicateCompile { .. } => {
                MfmfError::Rule(RuleError::Invalid(err.to_string()))
            }
            LogFilterError::Config { field, reason } => {
                MfmfError::Config(mfmf_core::error::ConfigError::InvalidValue { field, reason })
            }
            LogFilterError::Walk { .. } => MfmfError::Scan(ScanError::Walk(err.to_string())),
            LogFilterError::Output(_) => MfmfError::Scan(ScanError::Output(err.to_string())),
            LogFilterError::Io(e) => MfmfError::Io(e),
        }
    }
}
