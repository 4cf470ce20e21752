#![no_main]

use libfuzzer_sys::fuzz_target;

use mfmf_core::types::Encoding;
use mfmf_log_filter::encoding::decode_lines;

fuzz_target!(|data: &[u8]| {
    for encoding in [Encoding::Utf8, Encoding::Latin1, Encoding::Ascii] {
        if let Ok(lines) = decode_lines(data, encoding) {
            // 디코딩된 라인에는 줄바꿈이 남지 않는다
            assert!(lines.iter().all(|line| !line.contains('\n')));
        }
    }

    // latin-1은 모든 바이트열을 디코딩한다
    assert!(decode_lines(data, Encoding::Latin1).is_ok());
});
