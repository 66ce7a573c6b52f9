//! 파일별 집계를 최종 결과로 합침

use authpost_core::types::{AuthEvent, Outcome, SearchResult, SkippedFile};

/// 파일 하나의 집계
#[derive(Debug, Default)]
pub struct FileTally {
    /// 성공 매칭 수
    pub success: u64,
    /// 실패 매칭 수
    pub failed: u64,
    /// 페이지 창에 든 이벤트 (최신순)
    pub events: Vec<AuthEvent>,
}

impl FileTally {
    /// 지금까지 센 매칭 수 (다음 이벤트의 파일 내 위치)
    pub fn matched(&self) -> u64 {
        self.success + self.failed
    }

    /// 매칭 하나를 셉니다.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.success += 1,
            Outcome::Failure => self.failed += 1,
        }
    }
}

/// 질의 결과 누적기
///
/// 파일 처리 순서대로 [`FileTally`]를 받아 이벤트를 이어 붙이고 카운트를 더합니다.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    result: SearchResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 파일 하나의 집계를 더합니다.
    pub fn absorb(&mut self, tally: FileTally) {
        self.result.successful_count += tally.success;
        self.result.failed_count += tally.failed;
        self.result.events.extend(tally.events);
    }

    /// 건너뛴 파일을 기록합니다.
    pub fn skip(&mut self, skipped: SkippedFile) {
        self.result.skipped_files.push(skipped);
    }

    pub fn extend_skipped(&mut self, skipped: impl IntoIterator<Item = SkippedFile>) {
        self.result.skipped_files.extend(skipped);
    }

    /// 취소나 데드라인으로 중단되었음을 표시합니다.
    pub fn mark_partial(&mut self) {
        self.result.partial = true;
    }

    /// 최종 결과. 전체 수는 성공 수와 실패 수의 합입니다.
    pub fn finish(mut self) -> SearchResult {
        self.result.total_count = self.result.successful_count + self.result.failed_count;
        self.result
    }
}
