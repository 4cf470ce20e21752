//! mfmf-core -- 다중 파일 / 다중 필터 로그 스캐너의 공통 크레이트
//!
//! # 모듈 구성
//!
//! - [`config`]: `mfmf.toml` 파싱, 환경변수 오버라이드, 유효성 검증
//! - [`error`]: 최상위 에러 계층
//! - [`types`]: 크레이트 간에 공유되는 도메인 타입 ([`MatchRecord`], [`Encoding`], [`PredicateMode`], [`OutputFormat`])

pub mod config;
pub mod error;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, MfmfError, RuleError, ScanError};

// 설정
pub use config::MfmfConfig;

// 도메인 타입
pub use types::{Encoding, MatchRecord, OutputFormat, PredicateMode};
