//! 술어 스크립트 -- 라인 규칙 매칭을 캡처 그룹 기반으로 한 번 더 거릅니다.
//!
//! 라인 규칙의 정규식이 매칭되면, 활성화된 술어가 캡처 그룹을 입력으로 받아
//! 참/거짓을 판정합니다. 거짓이면 해당 규칙만 탈락하고 다음 규칙으로 넘어갑니다.
//!
//! # 엔진
//! - [`PredicateMode::Expr`]: 부수효과 없는 불리언 표현식 ([`expr`])
//! - [`PredicateMode::Shell`]: POSIX 셸 스니펫 ([`shell`]), 격리 및 타임아웃 없음
//!
//! 술어는 규칙 로딩 시 한 번 컴파일되며 이후 재컴파일하지 않습니다.

pub mod expr;
pub mod shell;

use regex::{Captures, Regex};

pub use mfmf_core::types::PredicateMode;

use expr::Expr;
use shell::ShellScript;

/// shell 모드 기본 셸
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// 술어 컴파일 에러
#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    /// 표현식 문법 오류
    #[error("syntax error at offset {offset}: {message}")]
    Syntax {
        /// 소스 내 바이트 오프셋
        offset: usize,
        /// 에러 설명
        message: String,
    },

    /// 셸이 스크립트 문법을 거부함 (`sh -n`)
    #[error("shell rejected script: {0}")]
    ShellSyntax(String),

    /// 셸 실행 실패
    #[error("failed to run shell '{shell}': {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },
}

/// 술어 엔진 옵션
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateOptions {
    /// 술어 실행 모드
    pub mode: PredicateMode,
    /// shell 모드에서 사용할 셸 경로
    pub shell: String,
}

impl Default for PredicateOptions {
    fn default() -> Self {
        Self {
            mode: PredicateMode::Expr,
            shell: DEFAULT_SHELL.to_owned(),
        }
    }
}

impl PredicateOptions {
    /// 지정한 모드와 기본 셸로 옵션을 생성합니다.
    pub fn with_mode(mode: PredicateMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// 술어 입력 -- 한 번의 정규식 매칭에서 얻은 캡처 그룹
///
/// `groups[0]`은 캡처 그룹 1입니다. 매칭에 참여하지 않은 그룹은 `None`입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateInput<'t> {
    whole: &'t str,
    groups: Vec<Option<&'t str>>,
    named: Vec<(&'t str, Option<&'t str>)>,
}

impl<'t> PredicateInput<'t> {
    /// 캡처 값으로부터 직접 입력을 구성합니다.
    pub fn new(
        whole: &'t str,
        groups: Vec<Option<&'t str>>,
        named: Vec<(&'t str, Option<&'t str>)>,
    ) -> Self {
        Self {
            whole,
            groups,
            named,
        }
    }

    /// 정규식 매칭 결과로부터 입력을 구성합니다.
    pub fn from_captures(regex: &'t Regex, caps: &Captures<'t>) -> Self {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let groups = (1..caps.len())
            .map(|i| caps.get(i).map(|m| m.as_str()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .map(|name| (name, caps.name(name).map(|m| m.as_str())))
            .collect();
        Self {
            whole,
            groups,
            named,
        }
    }

    /// 매칭된 전체 문자열
    pub fn whole(&self) -> &'t str {
        self.whole
    }

    /// 1부터 시작하는 위치 캡처 그룹
    pub fn group(&self, index: usize) -> Option<&'t str> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(i).copied().flatten())
    }

    /// 이름 있는 캡처 그룹
    pub fn named(&self, name: &str) -> Option<&'t str> {
        self.named
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, value)| *value)
    }

    /// 위치 캡처 그룹 전체 (`[0]`이 그룹 1)
    pub fn groups(&self) -> &[Option<&'t str>] {
        &self.groups
    }

    /// 이름 있는 캡처 그룹 전체
    pub fn named_groups(&self) -> &[(&'t str, Option<&'t str>)] {
        &self.named
    }
}

#[derive(Debug, Clone)]
enum Program {
    Expr(Expr),
    Shell(ShellScript),
}

/// 컴파일된 술어 스크립트
///
/// 비활성 술어는 아무것도 실행하지 않고 항상 참을 반환합니다.
#[derive(Debug, Clone)]
pub struct PredicateScript {
    source: String,
    program: Option<Program>,
}

impl PredicateScript {
    /// 술어를 컴파일합니다. shell 모드는 [`DEFAULT_SHELL`]을 사용합니다.
    pub fn compile(
        source: &str,
        enabled: bool,
        mode: PredicateMode,
    ) -> Result<Self, PredicateError> {
        Self::compile_with(source, enabled, &PredicateOptions::with_mode(mode))
    }

    /// 옵션을 지정하여 술어를 컴파일합니다.
    ///
    /// # Errors
    /// - 활성 술어의 표현식 문법 오류
    /// - 활성 shell 술어를 셸이 거부하거나 셸을 실행할 수 없는 경우
    pub fn compile_with(
        source: &str,
        enabled: bool,
        options: &PredicateOptions,
    ) -> Result<Self, PredicateError> {
        let program = if enabled {
            Some(match options.mode {
                PredicateMode::Expr => Program::Expr(Expr::parse(source)?),
                PredicateMode::Shell => {
                    Program::Shell(ShellScript::compile(&options.shell, source)?)
                }
            })
        } else {
            None
        };

        Ok(Self {
            source: source.to_owned(),
            program,
        })
    }

    /// 아무 것도 하지 않는 비활성 술어
    pub fn disabled() -> Self {
        Self {
            source: String::new(),
            program: None,
        }
    }

    /// 술어 활성 여부
    pub fn is_enabled(&self) -> bool {
        self.program.is_some()
    }

    /// 술어 원문
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 술어를 실행하여 참/거짓을 판정합니다.
    pub fn run(&self, input: &PredicateInput<'_>) -> bool {
        let verdict = match &self.program {
            None => return true,
            Some(Program::Expr(expr)) => expr.evaluate(input),
            Some(Program::Shell(script)) => script.run(input),
        };
        tracing::trace!(
            script = %self.source,
            groups = ?input.groups(),
            verdict,
            "predicate evaluated"
        );
        verdict
    }
}
