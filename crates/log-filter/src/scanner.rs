//! 디렉토리 스캐너 -- 순회, basename 게이팅, 인코딩 폴백, 라인 매칭
//!
//! # 실행 흐름
//! ```text
//! Walking ──> Gating ──> Reading ──> LineScanning ──> (다음 파일) ──> Done
//!               │           │
//!          block 매칭 /   인코딩 체인 순서대로 재시도,
//!          allow 미매칭    모두 실패하면 파일 건너뜀
//!          이면 건너뜀
//! ```
//!
//! 한 파일의 레코드는 디코딩이 성공한 뒤에 한꺼번에 출력되므로,
//! 디코딩이 실패한 시도의 레코드가 부분적으로 출력되는 일은 없습니다.

use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use mfmf_core::types::MatchRecord;

use crate::config::ScannerConfig;
use crate::encoding::decode_lines;
use crate::error::LogFilterError;
use crate::output::RecordSink;
use crate::rule::{BasenameMatcher, LineMatcher};

/// 스캔 결과 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// 순회 중 발견한 일반 파일 수
    pub files_seen: u64,
    /// 차단 목록에 걸린 파일 수
    pub files_blocked: u64,
    /// 허용 목록에 없는 파일 수
    pub files_not_allowed: u64,
    /// 디코딩에 성공하여 라인 매칭까지 마친 파일 수
    pub files_scanned: u64,
    /// 모든 인코딩이 실패하여 건너뛴 파일 수
    pub files_failed: u64,
    /// 실패한 디코딩 시도 수
    pub decode_failures: u64,
    /// 첫 인코딩이 아닌 인코딩으로 성공한 파일 수
    pub fallback_decodes: u64,
    /// 매칭을 시도한 라인 수
    pub lines_scanned: u64,
    /// 출력한 레코드 수
    pub records: u64,
}

/// 로그 디렉토리 스캐너
///
/// 실행 동안 세 규칙 집합을 소유하며 스캔 중에는 읽기만 합니다.
pub struct Scanner {
    config: ScannerConfig,
    block_list: BasenameMatcher,
    allow_list: BasenameMatcher,
    line_matcher: LineMatcher,
}

impl Scanner {
    /// 설정의 규칙 디렉토리에서 세 규칙 파일을 로드하여 스캐너를 생성합니다.
    ///
    /// # Errors
    /// - 규칙 파일을 읽거나 파싱할 수 없는 경우
    /// - 정규식이나 활성 술어가 컴파일되지 않는 경우
    pub fn load(config: ScannerConfig) -> Result<Self, LogFilterError> {
        config.validate()?;

        if let Some(plugin) = &config.preprocessor_plugin {
            tracing::warn!(
                plugin = %plugin.display(),
                "preprocessor plugins are not supported, ignoring"
            );
        }

        let block_list = BasenameMatcher::load(config.block_path())?;
        let allow_list = BasenameMatcher::load(config.allow_path())?;
        let line_matcher = LineMatcher::load(config.pattern_path(), &config.predicate)?;

        block_list.rules().log("block_list");
        allow_list.rules().log("allow_list");
        tracing::info!(
            rules = line_matcher.len(),
            predicates = line_matcher.predicate_count(),
            exec_script = config.exec_script,
            mode = %config.predicate.mode,
            "line rules ready"
        );
        if config.exec_script && line_matcher.predicate_count() > 0 {
            tracing::warn!(
                mode = %config.predicate.mode,
                "predicate execution is enabled for this run"
            );
        }

        Ok(Self::new(config, block_list, allow_list, line_matcher))
    }

    /// 이미 컴파일된 규칙으로 스캐너를 생성합니다.
    pub fn new(
        config: ScannerConfig,
        block_list: BasenameMatcher,
        allow_list: BasenameMatcher,
        line_matcher: LineMatcher,
    ) -> Self {
        Self {
            config,
            block_list,
            allow_list,
            line_matcher,
        }
    }

    /// 스캐너 설정
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// 차단 목록
    pub fn block_list(&self) -> &BasenameMatcher {
        &self.block_list
    }

    /// 허용 목록
    pub fn allow_list(&self) -> &BasenameMatcher {
        &self.allow_list
    }

    /// 라인 규칙
    pub fn line_matcher(&self) -> &LineMatcher {
        &self.line_matcher
    }

    /// 디렉토리 트리를 스캔하여 매칭 레코드를 `sink`에 기록합니다.
    ///
    /// # Errors
    /// - 루트가 없거나 디렉토리가 아닌 경우, 순회 중 에러가 난 경우
    /// - 파일을 열거나 읽을 수 없는 경우
    /// - `sink` 기록에 실패한 경우
    pub fn run<S: RecordSink + ?Sized>(
        &self,
        root: impl AsRef<Path>,
        sink: &mut S,
    ) -> Result<ScanSummary, LogFilterError> {
        let root = root.as_ref();
        let mut summary = ScanSummary::default();

        match std::fs::metadata(root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(LogFilterError::Walk {
                    path: root.display().to_string(),
                    reason: "not a directory".to_owned(),
                });
            }
            Err(e) => {
                return Err(LogFilterError::Walk {
                    path: root.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        tracing::info!(root = %root.display(), "scan started");

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| LogFilterError::Walk {
                path: e
                    .path()
                    .unwrap_or(root)
                    .display()
                    .to_string(),
                reason: e.to_string(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            summary.files_seen += 1;

            let basename = entry.file_name().to_string_lossy();
            if let Some(index) = self.block_list.evaluate(&basename) {
                tracing::debug!(file = %entry.path().display(), rule = index, "file blocked, skipping");
                summary.files_blocked += 1;
                continue;
            }
            if self.allow_list.evaluate(&basename).is_none() {
                tracing::debug!(file = %entry.path().display(), "file not in allow list, skipping");
                summary.files_not_allowed += 1;
                continue;
            }

            if let Some(records) = self.scan_file(entry.path(), &mut summary)? {
                for record in &records {
                    sink.write_record(record)?;
                }
                summary.records += records.len() as u64;
            }
        }

        sink.flush()?;

        tracing::info!(
            files_seen = summary.files_seen,
            files_blocked = summary.files_blocked,
            files_not_allowed = summary.files_not_allowed,
            files_scanned = summary.files_scanned,
            files_failed = summary.files_failed,
            decode_failures = summary.decode_failures,
            fallback_decodes = summary.fallback_decodes,
            lines_scanned = summary.lines_scanned,
            records = summary.records,
            "scan finished"
        );
        Ok(summary)
    }

    /// 파일 하나를 인코딩 체인 순서대로 디코딩하고 매칭 레코드를 모읍니다.
    ///
    /// 모든 인코딩이 실패하면 `None`을 반환합니다.
    pub fn scan_file(
        &self,
        path: &Path,
        summary: &mut ScanSummary,
    ) -> Result<Option<Vec<MatchRecord>>, LogFilterError> {
        tracing::debug!(file = %path.display(), "scanning file");

        let bytes = std::fs::read(path).inspect_err(|e| {
            tracing::error!(file = %path.display(), error = %e, "failed to read log file");
        })?;

        for (attempt, &encoding) in self.config.encodings.iter().enumerate() {
            if attempt > 0 {
                tracing::warn!(
                    file = %path.display(),
                    encoding = %encoding,
                    "retrying with fallback encoding, non-ASCII text may be rendered incorrectly"
                );
            }

            let lines = match decode_lines(&bytes, encoding) {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "failed to decode log file");
                    summary.decode_failures += 1;
                    continue;
                }
            };

            if attempt > 0 {
                summary.fallback_decodes += 1;
            }
            summary.files_scanned += 1;
            summary.lines_scanned += lines.len() as u64;

            let file_path = path.display().to_string();
            let records = lines
                .iter()
                .filter_map(|line| {
                    let text = line.trim();
                    self.line_matcher
                        .evaluate(text, self.config.exec_script)
                        .map(|index| MatchRecord::new(file_path.as_str(), text, index))
                })
                .collect();
            return Ok(Some(records));
        }

        tracing::error!(
            file = %path.display(),
            attempts = self.config.encodings.len(),
            "all encodings failed, skipping file"
        );
        summary.files_failed += 1;
        Ok(None)
    }
}
