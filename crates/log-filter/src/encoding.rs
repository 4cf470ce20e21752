//! 인코딩 디코더 -- 로그 파일 바이트를 라인 단위 문자열로 변환합니다.
//!
//! 스캐너는 파일 전체를 메모리에 읽은 뒤 `\n` 기준으로 나누고,
//! 설정된 인코딩 체인의 첫 인코딩부터 [`decode_lines`]를 시도합니다.
//! 한 라인이라도 디코딩에 실패하면 그 시도 전체가 실패합니다.

use mfmf_core::types::Encoding;

/// 디코딩 실패 정보
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot decode line {line} as {encoding}: invalid byte 0x{byte:02x} at offset {offset}")]
pub struct DecodeError {
    /// 시도한 인코딩
    pub encoding: Encoding,
    /// 1부터 시작하는 라인 번호
    pub line: usize,
    /// 라인 내 바이트 오프셋
    pub offset: usize,
    /// 문제가 된 바이트
    pub byte: u8,
}

/// 바이트 버퍼를 `\n` 기준으로 나누어 각 라인을 디코딩합니다.
///
/// 마지막 `\n` 뒤의 빈 조각은 라인으로 취급하지 않습니다.
/// `\r` 제거 및 공백 트리밍은 호출자가 담당합니다.
pub fn decode_lines(bytes: &[u8], encoding: Encoding) -> Result<Vec<String>, DecodeError> {
    let mut lines = Vec::new();
    let mut rest = bytes;
    let mut line_no = 0;

    while !rest.is_empty() {
        line_no += 1;
        let (raw, next) = match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, &rest[rest.len()..]),
        };
        let text = decode(raw, encoding).map_err(|(offset, byte)| DecodeError {
            encoding,
            line: line_no,
            offset,
            byte,
        })?;
        lines.push(text);
        rest = next;
    }

    Ok(lines)
}

/// 단일 라인을 디코딩합니다. 실패 시 (오프셋, 바이트)를 반환합니다.
fn decode(raw: &[u8], encoding: Encoding) -> Result<String, (usize, u8)> {
    match encoding {
        Encoding::Utf8 => match std::str::from_utf8(raw) {
            Ok(s) => Ok(s.to_owned()),
            Err(e) => {
                let offset = e.valid_up_to();
                Err((offset, raw[offset]))
            }
        },
        // ISO-8859-1은 바이트 값이 곧 코드 포인트
        Encoding::Latin1 => Ok(raw.iter().map(|&b| char::from(b)).collect()),
        Encoding::Ascii => match raw.iter().position(|b| !b.is_ascii()) {
            Some(offset) => Err((offset, raw[offset])),
            None => Ok(raw.iter().map(|&b| char::from(b)).collect()),
        },
    }
}
