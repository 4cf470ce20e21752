//! 파일 basename 매처 -- 허용/차단 목록 게이팅
//!
//! 규칙은 basename의 **접두**에 매칭됩니다. 패턴 `abc`는 `abcdef`에는 매칭되지만
//! `xabc`에는 매칭되지 않습니다. 전체 이름 일치가 필요하면 패턴에 `$`를 붙입니다.

use std::io::Read;
use std::path::Path;

use crate::error::LogFilterError;

use super::RuleSet;
use super::loader::RuleLoader;
use super::types::BasenameRule;

/// 파일 basename 매처
#[derive(Debug, Clone, Default)]
pub struct BasenameMatcher {
    rules: RuleSet<BasenameRule>,
}

impl BasenameMatcher {
    /// 규칙 파일에서 매처를 로드합니다. 파일이 없으면 빈 매처입니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LogFilterError> {
        let path = path.as_ref();
        let rules = RuleLoader::load_basename_rules(path)?;
        Self::from_rules(rules, &path.display().to_string())
    }

    /// CSV 리더에서 매처를 생성합니다.
    pub fn parse<R: Read>(reader: R, source: &str) -> Result<Self, LogFilterError> {
        let rules = RuleLoader::parse_basename_rules(reader, source)?;
        Self::from_rules(rules, source)
    }

    /// 파싱된 규칙을 컴파일하여 매처를 생성합니다.
    pub fn from_rules(rules: Vec<BasenameRule>, source: &str) -> Result<Self, LogFilterError> {
        let mut set = RuleSet::new();
        for rule in rules {
            let regex = RuleLoader::compile_regex(&rule.meta, true, source)?;
            set.push(regex, rule);
        }
        Ok(Self { rules: set })
    }

    /// basename에 처음 매칭되는 규칙의 인덱스를 반환합니다.
    pub fn evaluate(&self, basename: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|compiled| compiled.regex.is_match(basename))
    }

    /// 컴파일된 규칙 집합
    pub fn rules(&self) -> &RuleSet<BasenameRule> {
        &self.rules
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
