//! 메트릭 상수 및 설명 등록
//!
//! 로그 검색 엔진이 기록하는 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 엔진은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않았으면 기록은 아무 효과가 없습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `authpost_log_search_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(authpost_core::metrics::LOG_SEARCH_QUERIES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 건너뛴 사유 레이블 키 (decompress, line_source, unreadable_dir)
pub const LABEL_REASON: &str = "reason";

/// 인증 결과 레이블 키 (success, failed)
pub const LABEL_OUTCOME: &str = "outcome";

// ─── Log Search 메트릭 ──────────────────────────────────────────────

/// 실행된 검색 질의 수 (counter)
pub const LOG_SEARCH_QUERIES_TOTAL: &str = "authpost_log_search_queries_total";

/// 필터링을 거친 로그 파일 수 (counter)
pub const LOG_SEARCH_FILES_SCANNED_TOTAL: &str = "authpost_log_search_files_scanned_total";

/// 건너뛴 파일 수 (counter, label: reason)
pub const LOG_SEARCH_FILES_SKIPPED_TOTAL: &str = "authpost_log_search_files_skipped_total";

/// 제자리 해제된 `.gz` 아카이브 수 (counter)
pub const LOG_SEARCH_ARCHIVES_DECOMPRESSED_TOTAL: &str =
    "authpost_log_search_archives_decompressed_total";

/// 필터를 통과하여 집계된 이벤트 수 (counter, label: outcome)
pub const LOG_SEARCH_EVENTS_MATCHED_TOTAL: &str = "authpost_log_search_events_matched_total";

/// 페이지 창에 들어 실제로 반환된 이벤트 수 (counter)
pub const LOG_SEARCH_EVENTS_MATERIALIZED_TOTAL: &str =
    "authpost_log_search_events_materialized_total";

/// 지역 조회에 실패한 주소 수 (counter)
pub const LOG_SEARCH_GEO_LOOKUP_MISSES_TOTAL: &str =
    "authpost_log_search_geo_lookup_misses_total";

/// 질의 한 건의 소요 시간 (histogram, 초)
pub const LOG_SEARCH_QUERY_DURATION_SECONDS: &str = "authpost_log_search_query_duration_seconds";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 질의 소요 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 60s 범위 (압축 해제와 전체 파일 스캔 포함)
pub const QUERY_DURATION_BUCKETS: [f64; 10] =
    [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 60.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        LOG_SEARCH_QUERIES_TOTAL,
        "Total number of authentication log search queries executed"
    );
    describe_counter!(
        LOG_SEARCH_FILES_SCANNED_TOTAL,
        "Total number of log files passed through the line filter"
    );
    describe_counter!(
        LOG_SEARCH_FILES_SKIPPED_TOTAL,
        "Total number of log files skipped, by reason"
    );
    describe_counter!(
        LOG_SEARCH_ARCHIVES_DECOMPRESSED_TOTAL,
        "Total number of gzip archives decompressed next to the original"
    );
    describe_counter!(
        LOG_SEARCH_EVENTS_MATCHED_TOTAL,
        "Total number of matched authentication events, by outcome"
    );
    describe_counter!(
        LOG_SEARCH_EVENTS_MATERIALIZED_TOTAL,
        "Total number of events returned inside a page window"
    );
    describe_counter!(
        LOG_SEARCH_GEO_LOOKUP_MISSES_TOTAL,
        "Total number of addresses with no geo database entry"
    );
    describe_histogram!(
        LOG_SEARCH_QUERY_DURATION_SECONDS,
        "Time to complete a single search query in seconds"
    );
}
