//! 규칙 엔진 -- CSV 규칙 파일 기반 basename 게이팅과 라인 매칭
//!
//! # 규칙 파일
//! ```text
//! blocked_file_list.csv / allowed_file_list.csv
//!   rule_enable,rule_name,is_case_senstive,file_basename_regexp
//!
//! pattern_config.csv
//!   pattern_enable,pattern_name,is_case_senstive,regexp_pattern,exec_filter_enable,exec_filter_script
//! ```
//!
//! # 아키텍처
//! - [`RuleSet`]: 활성 행 순서를 그대로 유지하는 컴파일된 규칙 목록
//! - [`loader`]: CSV 파싱, 필수 컬럼 검사, 정규식/술어 컴파일
//! - [`basename`]: 파일 basename 접두 매칭 ([`BasenameMatcher`])
//! - [`line`]: 라인 검색 + 술어 판정 ([`LineMatcher`])
//! - [`types`]: 규칙 데이터 구조 정의

pub mod basename;
pub mod line;
pub mod loader;
pub mod types;

pub use basename::BasenameMatcher;
pub use line::LineMatcher;
pub use loader::RuleLoader;
pub use types::{BasenameRule, LineRule, Rule, RuleMeta};

use regex::Regex;

/// 컴파일된 규칙 하나
#[derive(Debug, Clone)]
pub struct CompiledRule<R> {
    /// 컴파일된 정규식
    pub regex: Regex,
    /// 규칙 원본 데이터
    pub rule: R,
}

/// 컴파일된 규칙 집합
///
/// 규칙은 파일의 활성 행 순서 그대로 저장되며 정렬, 중복 제거, 재배치를 하지 않습니다.
/// 평가는 항상 앞에서부터 진행하며 첫 매칭 규칙의 인덱스를 돌려줍니다.
#[derive(Debug, Clone)]
pub struct RuleSet<R> {
    rules: Vec<CompiledRule<R>>,
}

impl<R> Default for RuleSet<R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<R> RuleSet<R> {
    /// 빈 규칙 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 규칙을 맨 뒤에 추가합니다.
    pub fn push(&mut self, regex: Regex, rule: R) {
        self.rules.push(CompiledRule { regex, rule });
    }

    /// 규칙 수
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 규칙이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 인덱스로 규칙을 조회합니다.
    pub fn get(&self, index: usize) -> Option<&CompiledRule<R>> {
        self.rules.get(index)
    }

    /// 평가 순서대로 규칙을 순회합니다.
    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule<R>> {
        self.rules.iter()
    }
}

impl<'a, R> IntoIterator for &'a RuleSet<R> {
    type Item = &'a CompiledRule<R>;
    type IntoIter = std::slice::Iter<'a, CompiledRule<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl<R: Rule> RuleSet<R> {
    /// 각 규칙을 info 레벨로 기록합니다.
    pub fn log(&self, label: &str) {
        tracing::info!(set = label, count = self.len(), "rule set");
        for (index, compiled) in self.iter().enumerate() {
            let meta = compiled.rule.meta();
            tracing::info!(
                set = label,
                index,
                rule = %meta,
                pattern = %compiled.regex.as_str(),
                "rule"
            );
        }
    }
}
