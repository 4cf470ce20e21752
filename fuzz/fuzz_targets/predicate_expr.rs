#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use mfmf_log_filter::predicate::expr::Expr;
use mfmf_log_filter::predicate::PredicateInput;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 술어 원문
    source: String,
    /// 매칭된 전체 텍스트
    whole: String,
    /// 위치 캡처 그룹 (최대 9개로 제한)
    groups: Vec<Option<String>>,
    /// 이름 있는 캡처 그룹
    named: Vec<(String, Option<String>)>,
}

fuzz_target!(|input: FuzzInput| {
    // 파싱 실패는 정상 경로
    let Ok(expr) = Expr::parse(&input.source) else {
        return;
    };

    let groups: Vec<Option<&str>> = input
        .groups
        .iter()
        .take(9)
        .map(|g| g.as_deref())
        .collect();
    let named: Vec<(&str, Option<&str>)> = input
        .named
        .iter()
        .take(9)
        .map(|(name, value)| (name.as_str(), value.as_deref()))
        .collect();
    let predicate_input = PredicateInput::new(&input.whole, groups, named);

    // 평가는 어떤 입력에도 패닉 없이 bool을 돌려줘야 한다
    let _ = expr.evaluate(&predicate_input);
});
