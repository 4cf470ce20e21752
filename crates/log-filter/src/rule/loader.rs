//! 규칙 파일 로더 -- CSV 규칙 파일을 디스크에서 로드합니다.
//!
//! 헤더 행이 필수이며 필드는 컬럼 이름으로 찾습니다.
//! 행마다 필드 수가 달라도 되지만, 필요한 필드가 빠진 행은 로딩 전체를 실패시킵니다.
//! 규칙 파일이 없으면 경고 로그를 남기고 빈 목록을 돌려줍니다.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use regex::{Regex, RegexBuilder};

use crate::error::LogFilterError;

use super::types::{
    BasenameRule, LineRule, RuleMeta, TOKEN_FALSE, TOKEN_TRUE, basename_columns, line_columns,
};

/// 규칙 파일 최대 크기
const MAX_RULE_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB
/// 컴파일된 정규식 최대 크기
const MAX_REGEX_SIZE: usize = 10 * 1024 * 1024;

/// 규칙 파일 로더
pub struct RuleLoader;

impl RuleLoader {
    /// 규칙 파일을 읽습니다. 파일이 없으면 경고 후 `None`을 반환합니다.
    ///
    /// # Errors
    /// - 메타데이터나 내용을 읽을 수 없는 경우
    /// - 파일 크기가 `MAX_RULE_FILE_SIZE`를 초과하는 경우
    pub fn read_file(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>, LogFilterError> {
        let path = path.as_ref();

        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "rule file does not exist, using empty rule set"
                );
                return Ok(None);
            }
            Err(e) => {
                return Err(LogFilterError::RuleLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file metadata: {e}"),
                });
            }
        };

        if !metadata.is_file() {
            tracing::warn!(
                path = %path.display(),
                "rule path is not a regular file, using empty rule set"
            );
            return Ok(None);
        }

        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(LogFilterError::RuleLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content = std::fs::read(path).map_err(|e| LogFilterError::RuleLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file: {e}"),
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "read rule file");
        Ok(Some(content))
    }

    /// basename 규칙 파일을 로드합니다. 활성 행만 파일 순서대로 반환합니다.
    pub fn load_basename_rules(
        path: impl AsRef<Path>,
    ) -> Result<Vec<BasenameRule>, LogFilterError> {
        let path = path.as_ref();
        match Self::read_file(path)? {
            Some(content) => {
                Self::parse_basename_rules(content.as_slice(), &path.display().to_string())
            }
            None => Ok(Vec::new()),
        }
    }

    /// 라인 규칙 파일을 로드합니다. 활성 행만 파일 순서대로 반환합니다.
    pub fn load_line_rules(path: impl AsRef<Path>) -> Result<Vec<LineRule>, LogFilterError> {
        let path = path.as_ref();
        match Self::read_file(path)? {
            Some(content) => Self::parse_line_rules(content.as_slice(), &path.display().to_string()),
            None => Ok(Vec::new()),
        }
    }

    /// basename 규칙 CSV를 파싱합니다.
    ///
    /// `source`는 에러 메시지와 로그에 쓰이는 파일 이름입니다.
    pub fn parse_basename_rules<R: Read>(
        reader: R,
        source: &str,
    ) -> Result<Vec<BasenameRule>, LogFilterError> {
        use basename_columns as col;

        let mut rules = Vec::new();
        for_each_row(reader, source, |row| {
            if !row.is_enabled(col::ENABLE)? {
                row.log_disabled(col::NAME);
                return Ok(());
            }
            let meta = row.meta(col::NAME, col::CASE_SENSITIVE, col::PATTERN)?;
            rules.push(BasenameRule { meta });
            Ok(())
        })?;

        tracing::info!(path = source, count = rules.len(), "loaded basename rules");
        Ok(rules)
    }

    /// 라인 규칙 CSV를 파싱합니다.
    ///
    /// `exec_filter_script`는 `exec_filter_enable`이 `"true"`인 행에서만 필수입니다.
    pub fn parse_line_rules<R: Read>(
        reader: R,
        source: &str,
    ) -> Result<Vec<LineRule>, LogFilterError> {
        use line_columns as col;

        let mut rules = Vec::new();
        for_each_row(reader, source, |row| {
            if !row.is_enabled(col::ENABLE)? {
                row.log_disabled(col::NAME);
                return Ok(());
            }
            let meta = row.meta(col::NAME, col::CASE_SENSITIVE, col::PATTERN)?;
            let predicate_enabled = row.is_enabled(col::PREDICATE_ENABLE)?;
            let predicate_source = if predicate_enabled {
                row.require(col::PREDICATE_SCRIPT)?.to_owned()
            } else {
                row.get(col::PREDICATE_SCRIPT).unwrap_or_default().to_owned()
            };
            rules.push(LineRule {
                meta,
                predicate_enabled,
                predicate_source,
            });
            Ok(())
        })?;

        tracing::info!(path = source, count = rules.len(), "loaded line rules");
        Ok(rules)
    }

    /// 규칙 정규식을 컴파일합니다.
    ///
    /// `anchored`이면 `^(?:pattern)`으로 감싸 문자열 시작에 고정된 접두 매칭을 합니다.
    /// `case_sensitive`가 거짓이면 대소문자를 무시합니다.
    pub fn compile_regex(
        meta: &RuleMeta,
        anchored: bool,
        source: &str,
    ) -> Result<Regex, LogFilterError> {
        let pattern = if anchored {
            format!("^(?:{})", meta.pattern)
        } else {
            meta.pattern.clone()
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!meta.case_sensitive)
            .size_limit(MAX_REGEX_SIZE)
            .build()
            .map_err(|e| LogFilterError::RuleRegex {
                path: source.to_owned(),
                rule: meta.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            path = source,
            rule = %meta,
            ordinal = meta.ordinal,
            pattern = %regex.as_str(),
            case_sensitive = meta.case_sensitive,
            "compiled rule"
        );
        Ok(regex)
    }
}

/// 헤더 이름으로 필드를 찾는 CSV 행 뷰
struct Row<'r> {
    record: &'r StringRecord,
    columns: &'r HashMap<String, usize>,
    source: &'r str,
    /// 헤더를 1번째 줄로 센 줄 번호
    line: u64,
    ordinal: usize,
}

impl<'r> Row<'r> {
    fn get(&self, field: &str) -> Option<&'r str> {
        self.columns
            .get(field)
            .and_then(|&index| self.record.get(index))
    }

    fn require(&self, field: &str) -> Result<&'r str, LogFilterError> {
        self.get(field).ok_or_else(|| LogFilterError::RuleRow {
            path: self.source.to_owned(),
            row: self.line,
            field: field.to_owned(),
        })
    }

    fn is_enabled(&self, field: &str) -> Result<bool, LogFilterError> {
        Ok(self.require(field)? == TOKEN_TRUE)
    }

    fn meta(&self, name: &str, case: &str, pattern: &str) -> Result<RuleMeta, LogFilterError> {
        Ok(RuleMeta {
            name: self.get(name).unwrap_or_default().to_owned(),
            case_sensitive: self.require(case)? != TOKEN_FALSE,
            pattern: self.require(pattern)?.to_owned(),
            ordinal: self.ordinal,
        })
    }

    fn log_disabled(&self, name: &str) {
        tracing::debug!(
            path = self.source,
            row = self.line,
            rule = self.get(name).unwrap_or_default(),
            "rule disabled, skipping"
        );
    }
}

fn for_each_row<R, F>(reader: R, source: &str, mut visit: F) -> Result<(), LogFilterError>
where
    R: Read,
    F: FnMut(&Row<'_>) -> Result<(), LogFilterError>,
{
    let csv_error = |e: csv::Error| LogFilterError::RuleLoad {
        path: source.to_owned(),
        reason: format!("CSV parse error: {e}"),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: HashMap<String, usize> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim_start_matches('\u{feff}').trim().to_owned(), index))
        .collect();

    let mut record = StringRecord::new();
    let mut ordinal = 0;
    while reader.read_record(&mut record).map_err(csv_error)? {
        let line = record
            .position()
            .map_or(ordinal as u64 + 2, |position| position.line());
        let row = Row {
            record: &record,
            columns: &columns,
            source,
            line,
            ordinal,
        };
        visit(&row)?;
        ordinal += 1;
    }

    Ok(())
}
