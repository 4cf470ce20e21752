//! 에러 타입 -- 도메인별 에러 정의

/// mfmf 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum MfmfError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 규칙 파일 로딩/컴파일 에러
    #[error("rule error: {0}")]
    Rule(#[from] RuleError),

    /// 스캔 실행 중 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 규칙 에러
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// 규칙 파일을 읽거나 해석할 수 없음
    #[error("failed to load rules: {0}")]
    Load(String),

    /// 규칙 행이 유효하지 않음 (필드 누락, 잘못된 정규식, 술어 컴파일 실패)
    #[error("invalid rule: {0}")]
    Invalid(String),
}

/// 스캔 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 디렉토리 순회 실패
    #[error("walk failed: {0}")]
    Walk(String),

    /// 출력 스트림 기록 실패
    #[error("output failed: {0}")]
    Output(String),
}
