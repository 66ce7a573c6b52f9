//! 로그 검색 엔진: 질의 한 건의 전체 흐름 관리
//!
//! # 내부 아키텍처
//!
//! ```text
//! log_root --> FileDiscoverer --> order_for_processing --> [file, file, ...]
//!                  |                                            |
//!             (.gz 해제)                              LineSource + LinePredicate
//!                                                               |
//!                                                    parse_line (라인 역순)
//!                                                               |
//!                                          PageWindow 안? --yes--> TimestampResolver + GeoLookup
//!                                                               |
//!                                                       ResultAggregator --> SearchResult
//! ```
//!
//! 파일은 정해진 순서대로 하나씩 처리합니다. 페이지 창은 파일 하나가 끝나야
//! 그 파일의 매칭 수를 알 수 있으므로 파일 단위 병렬화는 하지 않습니다.
//! 취소 토큰과 데드라인은 파일 경계마다 확인합니다.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};

use authpost_core::geo::{GeoLookup, area_or_empty};
use authpost_core::metrics as m;
use authpost_core::types::{
    LogFamily, OutcomeFilter, SearchQuery, SearchResult, SkipReason, SkippedFile,
};

use crate::aggregate::{FileTally, ResultAggregator};
use crate::config::SearchConfig;
use crate::discovery::{Discovery, FileDiscoverer, LogFileRef};
use crate::error::LogSearchError;
use crate::filter::LinePredicate;
use crate::geo::GeoDatabase;
use crate::ordering::order_for_processing;
use crate::parser::{TimestampResolver, parse_line};
use crate::source::{FileLineSource, LineSource};
use crate::window::PageWindow;

/// SSH 인증 로그 검색 엔진
///
/// `Clone`은 내부 `Arc`만 복제하므로 여러 태스크에서 공유해도 됩니다.
/// 지역 DB는 빌드 시 한 번 로드되고 이후 읽기 전용입니다.
#[derive(Clone)]
pub struct LogSearchEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: SearchConfig,
    discoverer: FileDiscoverer,
    resolver: TimestampResolver,
    line_source: Arc<dyn LineSource>,
    geo: Option<Arc<dyn GeoLookup>>,
}

impl LogSearchEngine {
    /// 새 빌더를 생성합니다.
    pub fn builder() -> LogSearchEngineBuilder {
        LogSearchEngineBuilder::new()
    }

    /// 엔진 설정
    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }

    /// 지역 조회가 준비되었는지 반환합니다.
    pub fn has_geo(&self) -> bool {
        self.inner.geo.is_some()
    }

    /// 질의 하나를 실행합니다.
    ///
    /// 파일 I/O는 `spawn_blocking`에서 수행됩니다.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResult, LogSearchError> {
        self.search_with_cancel(query, CancellationToken::new())
            .await
    }

    /// 취소 토큰과 함께 질의를 실행합니다.
    ///
    /// 토큰이 취소되면 다음 파일 경계에서 멈추고 `partial = true`인
    /// 중간 결과를 반환합니다.
    pub async fn search_with_cancel(
        &self,
        query: SearchQuery,
        cancel: CancellationToken,
    ) -> Result<SearchResult, LogSearchError> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.search_blocking(&query, &cancel))
            .await
            .map_err(|e| LogSearchError::Task(format!("spawn_blocking failed: {e}")))?
    }

    /// 질의를 현재 스레드에서 실행합니다 (blocking).
    ///
    /// # Errors
    ///
    /// - 질의 검증 실패: `LogSearchError::Query`
    /// - 로그 루트 열거 실패: `LogSearchError::RootUnreadable`
    ///
    /// 파일 단위 실패는 에러가 아니라 `skipped_files`에 기록됩니다.
    pub fn search_blocking(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, LogSearchError> {
        query.validate(self.inner.config.max_page_size)?;

        let span = info_span!(
            "log_search",
            page = query.page,
            page_size = query.page_size,
            outcome = %query.outcome
        );
        let _guard = span.enter();

        let started = Instant::now();
        let deadline = self.inner.config.query_timeout().map(|t| started + t);
        counter!(m::LOG_SEARCH_QUERIES_TOTAL).increment(1);

        let discovery = self.discover_ordered()?;
        let keyword = query.keyword.as_deref();
        let secure = LinePredicate::new(LogFamily::Secure, query.outcome, keyword)?;
        let auth = LinePredicate::new(LogFamily::Auth, query.outcome, keyword)?;

        let mut aggregator = ResultAggregator::new();
        aggregator.extend_skipped(discovery.skipped);
        let mut window = PageWindow::for_page(query.page, query.page_size);

        for file in &discovery.files {
            if cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    next_file = %file.path.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "search stopped before completion, returning partial result"
                );
                aggregator.mark_partial();
                break;
            }

            let predicate = match file.family {
                LogFamily::Secure => &secure,
                LogFamily::Auth => &auth,
            };

            let lines = match self.inner.line_source.matching_lines(&file.path, predicate) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "line source failed, skipping file");
                    counter!(
                        m::LOG_SEARCH_FILES_SKIPPED_TOTAL,
                        m::LABEL_REASON => SkipReason::LineSource.as_str()
                    )
                    .increment(1);
                    aggregator.skip(SkippedFile::new(
                        &file.path,
                        SkipReason::LineSource,
                        e.to_string(),
                    ));
                    continue;
                }
            };
            counter!(m::LOG_SEARCH_FILES_SCANNED_TOTAL).increment(1);

            let tally = self.tally_file(file, &lines, query.outcome, &window);
            debug!(
                path = %file.path.display(),
                family = %file.family,
                filter = %predicate,
                lines = lines.len(),
                success = tally.success,
                failed = tally.failed,
                materialized = tally.events.len(),
                window_from = window.from(),
                window_to = window.to(),
                "file processed"
            );

            window.advance(tally.matched());
            aggregator.absorb(tally);
        }

        let result = aggregator.finish();
        let elapsed = started.elapsed();

        histogram!(m::LOG_SEARCH_QUERY_DURATION_SECONDS).record(elapsed.as_secs_f64());
        counter!(m::LOG_SEARCH_EVENTS_MATCHED_TOTAL, m::LABEL_OUTCOME => "success")
            .increment(result.successful_count);
        counter!(m::LOG_SEARCH_EVENTS_MATCHED_TOTAL, m::LABEL_OUTCOME => "failed")
            .increment(result.failed_count);
        counter!(m::LOG_SEARCH_EVENTS_MATERIALIZED_TOTAL).increment(result.events.len() as u64);

        info!(
            total = result.total_count,
            success = result.successful_count,
            failed = result.failed_count,
            returned = result.events.len(),
            skipped = result.skipped_files.len(),
            partial = result.partial,
            elapsed_ms = elapsed.as_millis() as u64,
            "search completed"
        );

        Ok(result)
    }

    /// 로그 루트를 탐색하고 처리 순서로 정렬합니다 (blocking).
    pub fn discover_ordered(&self) -> Result<Discovery, LogSearchError> {
        let mut discovery = self.inner.discoverer.discover(&self.inner.config.log_root)?;

        counter!(m::LOG_SEARCH_ARCHIVES_DECOMPRESSED_TOTAL).increment(discovery.decompressed);
        for skipped in &discovery.skipped {
            counter!(
                m::LOG_SEARCH_FILES_SKIPPED_TOTAL,
                m::LABEL_REASON => skipped.reason.as_str()
            )
            .increment(1);
        }

        discovery.files = order_for_processing(std::mem::take(&mut discovery.files));
        Ok(discovery)
    }

    /// 처리 순서대로 정렬된 파일 목록을 반환합니다.
    pub async fn list_files(&self) -> Result<Discovery, LogSearchError> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.discover_ordered())
            .await
            .map_err(|e| LogSearchError::Task(format!("spawn_blocking failed: {e}")))?
    }

    /// 파일 하나의 라인을 역순으로 훑어 집계합니다.
    ///
    /// 모든 매칭은 카운트에 들어가고, 페이지 창 안의 매칭만 이벤트로 만듭니다.
    fn tally_file(
        &self,
        file: &LogFileRef,
        lines: &[String],
        filter: OutcomeFilter,
        window: &PageWindow,
    ) -> FileTally {
        let mut tally = FileTally::default();

        for line in lines.iter().rev() {
            let Some(parsed) = parse_line(line) else {
                continue;
            };
            let outcome = parsed.outcome();
            if !filter.accepts(outcome) {
                continue;
            }

            if window.contains(tally.matched()) {
                let timestamp = self
                    .inner
                    .resolver
                    .resolve_line(file.rotation_year, &parsed);
                if timestamp.is_none() {
                    debug!(path = %file.path.display(), raw_date = %parsed.raw_date(), "timestamp not reconstructed");
                }
                let area = self.area(parsed.address);
                tally.events.push(parsed.into_event(timestamp, area));
            }

            tally.record(outcome);
        }

        tally
    }

    fn area(&self, address: &str) -> String {
        let area = area_or_empty(self.inner.geo.as_deref(), address);
        if area.is_empty() && self.inner.geo.is_some() {
            counter!(m::LOG_SEARCH_GEO_LOOKUP_MISSES_TOTAL).increment(1);
        }
        area
    }
}

impl std::fmt::Debug for LogSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSearchEngine")
            .field("log_root", &self.inner.config.log_root)
            .field("timezone", &self.inner.config.timezone)
            .field("geo", &self.inner.geo.is_some())
            .finish()
    }
}

/// 엔진 빌더
///
/// 라인 소스와 지역 조회를 지정하지 않으면 [`FileLineSource`]와
/// 설정의 MaxMind DB를 사용합니다.
pub struct LogSearchEngineBuilder {
    config: SearchConfig,
    line_source: Option<Arc<dyn LineSource>>,
    geo: Option<Arc<dyn GeoLookup>>,
}

impl LogSearchEngineBuilder {
    /// 기본 설정으로 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
            line_source: None,
            geo: None,
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// 라인 소스를 교체합니다.
    pub fn line_source(mut self, source: Arc<dyn LineSource>) -> Self {
        self.line_source = Some(source);
        self
    }

    /// 지역 조회 구현을 지정합니다. 설정의 DB 경로보다 우선합니다.
    pub fn geo_lookup(mut self, geo: Arc<dyn GeoLookup>) -> Self {
        self.geo = Some(geo);
        self
    }

    /// 엔진을 빌드합니다.
    ///
    /// 지역 DB를 열 수 없으면 경고만 남기고 지역 조회 없이 동작합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `LogSearchError::Config`
    pub fn build(self) -> Result<LogSearchEngine, LogSearchError> {
        self.config.validate()?;
        let tz = self.config.timezone()?;

        let line_source = self.line_source.unwrap_or_else(|| {
            Arc::new(FileLineSource::new(self.config.max_line_length)) as Arc<dyn LineSource>
        });

        let geo = match self.geo {
            Some(geo) => Some(geo),
            None if self.config.geo_enabled => match GeoDatabase::open(&self.config.geo_database_path) {
                Ok(db) => {
                    info!(path = %db.path().display(), "geo database loaded");
                    Some(Arc::new(db) as Arc<dyn GeoLookup>)
                }
                Err(e) => {
                    warn!(error = %e, "failed to load geo database, areas will be empty");
                    None
                }
            },
            None => None,
        };

        let inner = EngineInner {
            discoverer: FileDiscoverer::new(self.config.decompress_archives, tz),
            resolver: TimestampResolver::new(tz),
            config: self.config,
            line_source,
            geo,
        };

        Ok(LogSearchEngine {
            inner: Arc::new(inner),
        })
    }
}

impl Default for LogSearchEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfigBuilder;
    use authpost_core::error::SearchError;
    use authpost_core::types::Outcome;
    use std::fs;
    use std::path::Path;

    fn engine_for(root: &Path) -> LogSearchEngine {
        let config = SearchConfigBuilder::new()
            .log_root(root)
            .geo_enabled(false)
            .build()
            .unwrap();
        LogSearchEngine::builder().config(config).build().unwrap()
    }

    fn accepted(user: &str, ip: &str) -> String {
        format!("Jan 2 03:04:05 host sshd[1]: Accepted password for {user} from {ip} port 22 ssh2\n")
    }

    fn failed(user: &str, ip: &str) -> String {
        format!("Jan 2 03:04:06 host sshd[1]: Failed password for {user} from {ip} port 22 ssh2\n")
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = SearchConfig {
            timezone: "Nowhere/Land".to_owned(),
            ..SearchConfig::default()
        };
        assert!(LogSearchEngine::builder().config(config).build().is_err());
    }

    #[test]
    fn builder_degrades_when_geo_database_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = SearchConfigBuilder::new()
            .log_root(dir.path())
            .geo_enabled(true)
            .geo_database_path(dir.path().join("missing.mmdb"))
            .build()
            .unwrap();
        let engine = LogSearchEngine::builder().config(config).build().unwrap();
        assert!(!engine.has_geo());
    }

    #[test]
    fn invalid_query_is_rejected_before_io() {
        let engine = engine_for(Path::new("/nonexistent/authpost/root"));
        let err = engine
            .search_blocking(&SearchQuery::new(0, 10), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            LogSearchError::Query(SearchError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn unreadable_root_is_fatal() {
        let engine = engine_for(Path::new("/nonexistent/authpost/root"));
        let err = engine
            .search_blocking(&SearchQuery::default(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, LogSearchError::RootUnreadable { .. }));
    }

    #[test]
    fn lines_are_processed_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let content = [accepted("first", "1.1.1.1"), accepted("second", "2.2.2.2")].concat();
        fs::write(dir.path().join("secure"), content).unwrap();

        let result = engine_for(dir.path())
            .search_blocking(&SearchQuery::default(), &CancellationToken::new())
            .unwrap();
        let users: Vec<_> = result.events.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(users, vec!["second", "first"]);
    }

    #[test]
    fn counts_include_events_outside_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::new();
        for i in 0..5 {
            content.push_str(&accepted(&format!("u{i}"), "1.1.1.1"));
            content.push_str(&failed(&format!("f{i}"), "2.2.2.2"));
        }
        fs::write(dir.path().join("secure"), content).unwrap();

        let result = engine_for(dir.path())
            .search_blocking(&SearchQuery::new(1, 3), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.events.len(), 3);
        assert_eq!(result.total_count, 10);
        assert_eq!(result.successful_count, 5);
        assert_eq!(result.failed_count, 5);
    }

    #[test]
    fn cancelled_token_yields_partial_result() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("secure"), accepted("root", "1.2.3.4")).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = engine_for(dir.path())
            .search_blocking(&SearchQuery::default(), &cancel)
            .unwrap();
        assert!(result.partial);
        assert_eq!(result.total_count, 0);
    }

    #[test]
    fn outcome_filter_restricts_events() {
        let dir = tempfile::tempdir().unwrap();
        let content = [accepted("ok", "1.1.1.1"), failed("bad", "2.2.2.2")].concat();
        fs::write(dir.path().join("secure"), content).unwrap();
        let engine = engine_for(dir.path());

        let success = engine
            .search_blocking(
                &SearchQuery::default().with_outcome(OutcomeFilter::Success),
                &CancellationToken::new(),
            )
            .unwrap();
        assert!(success.events.iter().all(|e| e.outcome == Outcome::Success));
        assert_eq!(success.failed_count, 0);

        let failed = engine
            .search_blocking(
                &SearchQuery::default().with_outcome(OutcomeFilter::Failed),
                &CancellationToken::new(),
            )
            .unwrap();
        assert!(failed.events.iter().all(|e| e.outcome == Outcome::Failure));
        assert_eq!(failed.successful_count, 0);
    }

    #[tokio::test]
    async fn async_search_matches_blocking_search() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("auth.log"), accepted("root", "1.2.3.4")).unwrap();
        let engine = engine_for(dir.path());

        let blocking = engine
            .search_blocking(&SearchQuery::default(), &CancellationToken::new())
            .unwrap();
        let async_result = engine.search(SearchQuery::default()).await.unwrap();
        assert_eq!(blocking.events, async_result.events);
        assert_eq!(blocking.total_count, async_result.total_count);
    }

    #[tokio::test]
    async fn list_files_returns_processing_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["secure", "auth.log.1", "auth.log"] {
            fs::write(dir.path().join(name), "x\n").unwrap();
        }
        let discovery = engine_for(dir.path()).list_files().await.unwrap();
        let names: Vec<_> = discovery.files.iter().map(|f| f.file_name().to_owned()).collect();
        assert_eq!(names, vec!["auth.log", "auth.log.1", "secure"]);
    }
}
