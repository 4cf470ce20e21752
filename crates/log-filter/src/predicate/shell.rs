//! 셸 술어 -- 캡처 그룹을 환경변수로 넘겨 셸 스니펫을 실행합니다.
//!
//! 격리도 타임아웃도 없습니다. 스니펫은 호스트 프로세스 권한으로 실행되므로
//! 신뢰할 수 있는 규칙 파일에만 사용해야 합니다.
//!
//! # 환경변수
//! - `MFMF_MATCH`: 매칭된 전체 문자열
//! - `MFMF_GROUP_COUNT`: 위치 캡처 그룹 수
//! - `MFMF_GROUP_<n>`: 1부터 시작하는 위치 캡처 그룹 (참여한 그룹만)
//! - `MFMF_NAMED_<NAME>`: 이름 있는 캡처 그룹 (대문자, 참여한 그룹만)

use std::process::{Command, Stdio};

use super::{PredicateError, PredicateInput};

/// 문법 검사를 마친 셸 스크립트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScript {
    shell: String,
    source: String,
}

impl ShellScript {
    /// `sh -n -c`로 문법을 검사한 뒤 스크립트를 생성합니다.
    pub fn compile(shell: &str, source: &str) -> Result<Self, PredicateError> {
        let output = Command::new(shell)
            .arg("-n")
            .arg("-c")
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| PredicateError::Spawn {
                shell: shell.to_owned(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("exit status {}", output.status),
                msg => msg.to_owned(),
            };
            return Err(PredicateError::ShellSyntax(reason));
        }

        Ok(Self {
            shell: shell.to_owned(),
            source: source.to_owned(),
        })
    }

    /// 스크립트를 실행합니다. 종료 코드 0이면 참입니다.
    ///
    /// 스크립트의 stdout은 버려지며 매칭 출력 스트림에 섞이지 않습니다.
    pub fn run(&self, input: &PredicateInput<'_>) -> bool {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(&self.source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .env("MFMF_MATCH", input.whole())
            .env("MFMF_GROUP_COUNT", input.groups().len().to_string());

        for (i, group) in input.groups().iter().enumerate() {
            if let Some(value) = group {
                cmd.env(format!("MFMF_GROUP_{}", i + 1), value);
            }
        }
        for (name, value) in input.named_groups() {
            if let Some(value) = value {
                cmd.env(format!("MFMF_NAMED_{}", name.to_ascii_uppercase()), value);
            }
        }

        match cmd.status() {
            Ok(status) if status.success() => true,
            Ok(status) => {
                match status.code() {
                    Some(code) => tracing::warn!(
                        script = %self.source,
                        code,
                        "shell predicate returned non-zero, treating as false"
                    ),
                    None => tracing::warn!(
                        script = %self.source,
                        status = %status,
                        "shell predicate terminated by signal"
                    ),
                }
                false
            }
            Err(e) => {
                tracing::warn!(
                    shell = %self.shell,
                    script = %self.source,
                    error = %e,
                    "failed to spawn shell predicate, treating as false"
                );
                false
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const SH: &str = "/bin/sh";

    #[test]
    fn syntax_check_accepts_valid_script() {
        assert!(ShellScript::compile(SH, "test \"$MFMF_GROUP_1\" -gt 10").is_ok());
    }

    #[test]
    fn syntax_check_rejects_invalid_script() {
        let err = ShellScript::compile(SH, "if then fi (").unwrap_err();
        assert!(matches!(err, PredicateError::ShellSyntax(_)));
    }

    #[test]
    fn syntax_check_does_not_execute() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let script = format!("touch '{}'", marker.display());
        ShellScript::compile(SH, &script).unwrap();
        assert!(!marker.exists());
    }

    #[test]
    fn missing_shell_is_spawn_error() {
        let err = ShellScript::compile("/nonexistent/shell", "true").unwrap_err();
        assert!(matches!(err, PredicateError::Spawn { .. }));
    }

    #[test]
    fn exit_status_decides_verdict() {
        let input = PredicateInput::new("latency 1500", vec![Some("1500")], vec![]);
        let yes = ShellScript::compile(SH, "[ \"$MFMF_GROUP_1\" -gt 1000 ]").unwrap();
        let no = ShellScript::compile(SH, "[ \"$MFMF_GROUP_1\" -gt 2000 ]").unwrap();
        assert!(yes.run(&input));
        assert!(!no.run(&input));
    }

    #[test]
    fn exports_match_count_and_named_groups() {
        let input = PredicateInput::new(
            "user=bob",
            vec![Some("bob"), None],
            vec![("user", Some("bob"))],
        );
        let script = ShellScript::compile(
            SH,
            "[ \"$MFMF_MATCH\" = 'user=bob' ] && [ \"$MFMF_GROUP_COUNT\" = 2 ] \
             && [ \"$MFMF_NAMED_USER\" = bob ] && [ -z \"${MFMF_GROUP_2+set}\" ]",
        )
        .unwrap();
        assert!(script.run(&input));
    }
}
