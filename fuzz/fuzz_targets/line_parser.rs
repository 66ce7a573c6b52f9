#![no_main]

use authpost_log_search::{TimestampResolver, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    // 크래시나 패닉 없이 Some 또는 None을 반환해야 한다
    let Some(parsed) = parse_line(&line) else {
        return;
    };

    // 시간대 경계(DST)에서도 패닉 없이 None으로 떨어져야 한다
    let resolver = TimestampResolver::new(chrono_tz::America::New_York);
    let timestamp = resolver.resolve_line(2024, &parsed);
    let _ = parsed.into_event(timestamp, String::new());
});
