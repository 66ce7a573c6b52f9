#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use authpost_core::types::{LogFamily, OutcomeFilter};
use authpost_log_search::{LinePredicate, parse_line};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    secure: bool,
    outcome: FuzzOutcome,
    /// 키워드 (원시 라인 부분 문자열)
    keyword: Option<String>,
    lines: Vec<String>,
}

#[derive(Arbitrary, Debug)]
enum FuzzOutcome {
    Any,
    Success,
    Failed,
}

fuzz_target!(|input: FuzzInput| {
    let family = if input.secure {
        LogFamily::Secure
    } else {
        LogFamily::Auth
    };
    let outcome = match input.outcome {
        FuzzOutcome::Any => OutcomeFilter::Any,
        FuzzOutcome::Success => OutcomeFilter::Success,
        FuzzOutcome::Failed => OutcomeFilter::Failed,
    };

    // 마커는 고정 문자열이라 키워드와 무관하게 컴파일되어야 한다
    let predicate = match LinePredicate::new(family, outcome, input.keyword.as_deref()) {
        Ok(p) => p,
        Err(e) => panic!("marker set failed to compile: {e}"),
    };

    for line in input.lines.iter().take(64) {
        if !predicate.matches(line) {
            continue;
        }
        if let Some(keyword) = input.keyword.as_deref().filter(|k| !k.is_empty()) {
            assert!(line.contains(keyword), "matched line must contain the keyword");
        }
        let _ = parse_line(line);
    }
});
