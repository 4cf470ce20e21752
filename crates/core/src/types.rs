//! 도메인 타입 -- 크레이트 간에 공유되는 공통 타입

use std::fmt;

use serde::{Deserialize, Serialize};

/// 매칭 레코드
///
/// 라인 규칙에 매칭된 로그 라인 하나를 나타냅니다.
/// 스캐너가 출력 스트림에 기록하는 단위입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// 로그 파일 경로 (순회 루트 기준으로 결합된 경로)
    pub file_path: String,
    /// 앞뒤 공백이 제거된 라인 텍스트
    pub line_text: String,
    /// 컴파일된 라인 규칙 집합 내에서 처음 매칭된 규칙의 인덱스
    pub matched_rule_index: usize,
}

impl MatchRecord {
    /// 새 매칭 레코드를 생성합니다.
    pub fn new(
        file_path: impl Into<String>,
        line_text: impl Into<String>,
        matched_rule_index: usize,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line_text: line_text.into(),
            matched_rule_index,
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.file_path, self.matched_rule_index, self.line_text
        )
    }
}

/// 텍스트 인코딩
///
/// 로그 파일 디코딩 시 시도하는 인코딩입니다.
/// 설정의 `filter.encodings` 목록 순서대로 폴백합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// UTF-8 (엄격 디코딩)
    #[serde(rename = "utf-8")]
    Utf8,
    /// ISO-8859-1, 모든 바이트를 U+0000..U+00FF로 매핑하므로 실패하지 않음
    #[serde(rename = "latin-1")]
    Latin1,
    /// 7비트 ASCII (엄격 디코딩)
    #[serde(rename = "ascii")]
    Ascii,
}

impl Encoding {
    /// 설정 파일에서 사용하는 이름으로부터 인코딩을 찾습니다.
    ///
    /// 대소문자를 구분하지 않으며 `utf8`, `latin1`, `iso-8859-1` 별칭을 허용합니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Some(Self::Latin1),
            "ascii" | "us-ascii" => Some(Self::Ascii),
            _ => None,
        }
    }

    /// 정규화된 인코딩 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Ascii => "ascii",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 술어 실행 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateMode {
    /// 부수효과 없는 제한된 불리언 표현식
    #[default]
    Expr,
    /// POSIX 셸 스니펫 (격리 없음, 호스트 권한으로 실행)
    Shell,
}

impl PredicateMode {
    /// 설정 이름으로부터 모드를 찾습니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "expr" => Some(Self::Expr),
            "shell" => Some(Self::Shell),
            _ => None,
        }
    }

    /// 설정 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expr => "expr",
            Self::Shell => "shell",
        }
    }
}

impl fmt::Display for PredicateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 매칭 레코드 출력 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON Lines
    #[default]
    Json,
    /// `<file_path>:<matched_rule_index>: <line_text>`
    Text,
}

impl OutputFormat {
    /// 설정 이름으로부터 출력 형식을 찾습니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}
