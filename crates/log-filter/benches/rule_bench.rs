//! 규칙 매칭 벤치마크
//!
//! 라인 규칙 평가, 술어 평가, basename 게이팅 성능과 규칙 수에 따른 스케일링을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mfmf_log_filter::predicate::{PredicateInput, PredicateMode, PredicateScript};
use mfmf_log_filter::{BasenameMatcher, LineMatcher, PredicateOptions};

const BASENAME_HEADER: &str = "rule_enable,rule_name,is_case_senstive,file_basename_regexp\n";
const LINE_HEADER: &str = "pattern_enable,pattern_name,is_case_senstive,regexp_pattern,exec_filter_enable,exec_filter_script\n";

fn line_matcher(rule_count: usize, with_predicate: bool) -> LineMatcher {
    let mut csv = LINE_HEADER.to_owned();
    for i in 0..rule_count {
        csv.push_str(&format!("true,never{i},true,NEVER_{i}_MATCHES,false,\n"));
    }
    if with_predicate {
        csv.push_str("true,slow,true,latency_ms=(?P<ms>\\d+),true,$ms > 1000\n");
    } else {
        csv.push_str("true,slow,true,latency_ms=(?P<ms>\\d+),false,\n");
    }
    LineMatcher::parse(csv.as_bytes(), "bench.csv", &PredicateOptions::default())
        .expect("bench rules should compile")
}

fn bench_line_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_matching");
    let line = "2024-01-15T12:00:00Z web-01 api: GET /orders latency_ms=1520 status=200";

    for rule_count in [1, 10, 50, 100] {
        let matcher = line_matcher(rule_count, false);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("last_rule_hit", rule_count),
            &matcher,
            |b, matcher| b.iter(|| matcher.evaluate(black_box(line), false)),
        );
    }

    let matcher = line_matcher(10, true);
    group.bench_function("with_expr_predicate", |b| {
        b.iter(|| matcher.evaluate(black_box(line), true))
    });

    group.finish();
}

fn bench_predicate(c: &mut Criterion) {
    let script = PredicateScript::compile(
        "defined($ms) && $ms > 1000 && $1 startswith '1'",
        true,
        PredicateMode::Expr,
    )
    .expect("predicate should compile");
    let input = PredicateInput::new("latency_ms=1520", vec![Some("1520")], vec![("ms", Some("1520"))]);

    c.bench_function("expr_predicate_run", |b| {
        b.iter(|| script.run(black_box(&input)))
    });
}

fn bench_basename_gating(c: &mut Criterion) {
    let mut csv = BASENAME_HEADER.to_owned();
    csv.push_str("true,compressed,true,.*\\.(gz|zip|bz2)$\n");
    csv.push_str("true,debug,false,debug_\n");
    csv.push_str("true,logs,true,.*\\.log$\n");
    let matcher = BasenameMatcher::parse(csv.as_bytes(), "bench.csv").expect("should compile");

    let names = ["app.log", "app.log.1.gz", "DEBUG_dump.txt", "README"];
    c.bench_function("basename_gating", |b| {
        b.iter(|| {
            for name in names {
                black_box(matcher.evaluate(black_box(name)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_line_matching,
    bench_predicate,
    bench_basename_gating
);
criterion_main!(benches);
