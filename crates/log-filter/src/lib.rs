//! mfmf-log-filter -- 다중 파일 / 다중 필터 로그 스캐너 엔진
//!
//! # 모듈 구성
//!
//! - [`rule`]: CSV 규칙 로딩, basename 게이팅, 라인 매칭
//! - [`predicate`]: 라인 규칙 매칭을 캡처 그룹으로 거르는 술어 엔진 (expr, shell)
//! - [`scanner`]: 디렉토리 순회 및 파일별 스캔 오케스트레이션
//! - [`encoding`]: 인코딩 폴백 체인용 라인 디코더
//! - [`output`]: 매칭 레코드 출력 (JSON Lines, text)
//! - [`config`]: 스캐너 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! CSV 규칙 파일 -> RuleSet 컴파일 -> Scanner -> RecordSink
//!      |                |              |
//!  block/allow/     정규식 + 술어    walkdir 순회 + 인코딩 폴백
//!  pattern
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod output;
pub mod predicate;
pub mod rule;
pub mod scanner;

// --- 주요 타입 re-export ---

// 스캐너
pub use scanner::{ScanSummary, Scanner};

// 설정
pub use config::{ScannerConfig, ScannerConfigBuilder};

// 에러
pub use error::LogFilterError;

// 규칙
pub use rule::{BasenameMatcher, LineMatcher, RuleLoader, RuleSet};

// 술어
pub use predicate::{PredicateInput, PredicateMode, PredicateOptions, PredicateScript};

// 출력
pub use output::{RecordSink, RecordWriter};
