//! 규칙 타입 정의 -- CSV 행에서 읽어 들인 basename / 라인 규칙

use std::fmt;

use serde::Serialize;

/// CSV 규칙 파일에서 정확히 일치해야 활성으로 취급되는 토큰
pub const TOKEN_TRUE: &str = "true";
/// 대소문자 무시를 켜는 토큰 (`is_case_senstive` 컬럼)
pub const TOKEN_FALSE: &str = "false";

/// basename 규칙 파일의 컬럼명
pub mod basename_columns {
    pub const ENABLE: &str = "rule_enable";
    pub const NAME: &str = "rule_name";
    pub const CASE_SENSITIVE: &str = "is_case_senstive";
    pub const PATTERN: &str = "file_basename_regexp";
}

/// 라인 규칙 파일의 컬럼명
pub mod line_columns {
    pub const ENABLE: &str = "pattern_enable";
    pub const NAME: &str = "pattern_name";
    pub const CASE_SENSITIVE: &str = "is_case_senstive";
    pub const PATTERN: &str = "regexp_pattern";
    pub const PREDICATE_ENABLE: &str = "exec_filter_enable";
    pub const PREDICATE_SCRIPT: &str = "exec_filter_script";
}

/// 규칙 공통 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMeta {
    /// 규칙 이름 (비어 있을 수 있음)
    pub name: String,
    /// 정규식 원문
    pub pattern: String,
    /// 대소문자 구분 여부
    pub case_sensitive: bool,
    /// 원본 파일에서의 0부터 시작하는 데이터 행 번호 (비활성 행 포함)
    pub ordinal: usize,
}

impl fmt::Display for RuleMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "#{}", self.ordinal)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// 규칙 메타데이터 접근자
///
/// [`RuleSet`](super::RuleSet)이 규칙 종류와 무관하게 이름과 패턴을 노출할 때 사용합니다.
pub trait Rule {
    /// 공통 메타데이터를 반환합니다.
    fn meta(&self) -> &RuleMeta;
}

/// 파일 basename 규칙 (허용/차단 목록의 한 행)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasenameRule {
    #[serde(flatten)]
    pub meta: RuleMeta,
}

impl Rule for BasenameRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

/// 라인 규칙 (`pattern_config.csv`의 한 행)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRule {
    #[serde(flatten)]
    pub meta: RuleMeta,
    /// 술어 사용 여부 (`exec_filter_enable == "true"`)
    pub predicate_enabled: bool,
    /// 술어 원문
    pub predicate_source: String,
}

impl Rule for LineRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}
