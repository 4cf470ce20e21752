//! 라인 매처 -- 비고정 정규식 검색 + 선택적 술어 판정
//!
//! 규칙은 순서대로 시도합니다. 정규식이 매칭되어도 술어가 거짓이면
//! 그 규칙만 탈락하고 다음 규칙을 계속 시도합니다.

use std::io::Read;
use std::path::Path;

use crate::error::LogFilterError;
use crate::predicate::{PredicateInput, PredicateOptions, PredicateScript};

use super::RuleSet;
use super::loader::RuleLoader;
use super::types::LineRule;

/// 라인 매처
///
/// `predicates[i]`는 `rules[i]`의 술어입니다.
#[derive(Debug, Clone, Default)]
pub struct LineMatcher {
    rules: RuleSet<LineRule>,
    predicates: Vec<PredicateScript>,
}

impl LineMatcher {
    /// 규칙 파일에서 매처를 로드합니다. 파일이 없으면 빈 매처입니다.
    pub fn load(
        path: impl AsRef<Path>,
        options: &PredicateOptions,
    ) -> Result<Self, LogFilterError> {
        let path = path.as_ref();
        let rules = RuleLoader::load_line_rules(path)?;
        Self::from_rules(rules, &path.display().to_string(), options)
    }

    /// CSV 리더에서 매처를 생성합니다.
    pub fn parse<R: Read>(
        reader: R,
        source: &str,
        options: &PredicateOptions,
    ) -> Result<Self, LogFilterError> {
        let rules = RuleLoader::parse_line_rules(reader, source)?;
        Self::from_rules(rules, source, options)
    }

    /// 파싱된 규칙의 정규식과 술어를 컴파일합니다.
    ///
    /// 술어는 전역 실행 플래그와 무관하게 활성 행이면 모두 컴파일됩니다.
    pub fn from_rules(
        rules: Vec<LineRule>,
        source: &str,
        options: &PredicateOptions,
    ) -> Result<Self, LogFilterError> {
        let mut set = RuleSet::new();
        let mut predicates = Vec::with_capacity(rules.len());

        for rule in rules {
            let regex = RuleLoader::compile_regex(&rule.meta, false, source)?;
            let predicate = PredicateScript::compile_with(
                &rule.predicate_source,
                rule.predicate_enabled,
                options,
            )
            .map_err(|e| LogFilterError::PredicateCompile {
                rule: rule.meta.to_string(),
                reason: e.to_string(),
            })?;

            if predicate.is_enabled() {
                tracing::debug!(
                    rule = %rule.meta,
                    mode = %options.mode,
                    script = %predicate.source(),
                    "compiled predicate"
                );
            }
            predicates.push(predicate);
            set.push(regex, rule);
        }

        Ok(Self {
            rules: set,
            predicates,
        })
    }

    /// 라인에 처음으로 인정되는 규칙의 인덱스를 반환합니다.
    ///
    /// `predicates_enabled`가 거짓이면 술어를 실행하지 않고 정규식 매칭만 봅니다.
    /// 술어는 해당 규칙의 첫 (가장 왼쪽) 매칭을 입력으로 받습니다.
    pub fn evaluate(&self, line: &str, predicates_enabled: bool) -> Option<usize> {
        for (index, (compiled, predicate)) in self.rules.iter().zip(&self.predicates).enumerate() {
            if !predicates_enabled || !predicate.is_enabled() {
                if compiled.regex.is_match(line) {
                    return Some(index);
                }
                continue;
            }

            let Some(caps) = compiled.regex.captures(line) else {
                continue;
            };
            let input = PredicateInput::from_captures(&compiled.regex, &caps);
            if predicate.run(&input) {
                return Some(index);
            }
            tracing::trace!(rule = %compiled.rule.meta, "predicate rejected match");
        }
        None
    }

    /// 컴파일된 규칙 집합
    pub fn rules(&self) -> &RuleSet<LineRule> {
        &self.rules
    }

    /// 인덱스의 술어
    pub fn predicate(&self, index: usize) -> Option<&PredicateScript> {
        self.predicates.get(index)
    }

    /// 활성 술어 수
    pub fn predicate_count(&self) -> usize {
        self.predicates.iter().filter(|p| p.is_enabled()).count()
    }

    /// 규칙 수
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 규칙이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
