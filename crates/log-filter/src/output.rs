//! 매칭 레코드 출력
//!
//! [`RecordSink`]는 스캐너가 레코드를 내보내는 경계입니다.
//! [`RecordWriter`]는 임의의 `Write` 대상에 레코드를 한 줄씩 기록합니다.
//!
//! - `json`: `{"file_path":"…","line_text":"…","matched_rule_index":0}`
//! - `text`: `<file_path>:<matched_rule_index>: <line_text>`

use std::io::{BufWriter, Write};

use mfmf_core::types::{MatchRecord, OutputFormat};

use crate::error::LogFilterError;

/// 매칭 레코드 수신자
pub trait RecordSink {
    /// 레코드 하나를 기록합니다.
    fn write_record(&mut self, record: &MatchRecord) -> Result<(), LogFilterError>;

    /// 버퍼된 내용을 내보냅니다.
    fn flush(&mut self) -> Result<(), LogFilterError> {
        Ok(())
    }
}

impl RecordSink for Vec<MatchRecord> {
    fn write_record(&mut self, record: &MatchRecord) -> Result<(), LogFilterError> {
        self.push(record.clone());
        Ok(())
    }
}

/// 줄 단위 레코드 기록기
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    format: OutputFormat,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// 새 기록기를 생성합니다.
    pub fn new(inner: W, format: OutputFormat) -> Self {
        Self {
            inner: BufWriter::new(inner),
            format,
            written: 0,
        }
    }

    /// 출력 형식
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// 지금까지 기록한 레코드 수
    pub fn written(&self) -> u64 {
        self.written
    }

    /// 버퍼를 비우고 내부 `Write`를 돌려줍니다.
    pub fn into_inner(self) -> Result<W, LogFilterError> {
        self.inner
            .into_inner()
            .map_err(|e| LogFilterError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for RecordWriter<W> {
    fn write_record(&mut self, record: &MatchRecord) -> Result<(), LogFilterError> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.inner, record)?;
                self.inner.write_all(b"\n")?;
            }
            OutputFormat::Text => writeln!(self.inner, "{record}")?,
        }
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogFilterError> {
        self.inner.flush()?;
        Ok(())
    }
}
