#![no_main]

use libfuzzer_sys::fuzz_target;

use mfmf_log_filter::{BasenameMatcher, LineMatcher, PredicateOptions};

fuzz_target!(|data: &[u8]| {
    // 규칙 파일은 임의 바이트일 수 있다. 크래시 없이 Ok 또는 Err이어야 한다
    let _ = BasenameMatcher::parse(data, "fuzz-basename.csv");

    if let Ok(matcher) = LineMatcher::parse(data, "fuzz-pattern.csv", &PredicateOptions::default()) {
        let line = String::from_utf8_lossy(data);
        let _ = matcher.evaluate(&line, true);
    }
});
