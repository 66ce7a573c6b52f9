//! 파일 단위 라인 필터
//!
//! 계열과 결과 필터에서 [`LinePredicate`]를 만듭니다.
//! 마커는 `RegexSet` 하나로 한 번에 검사하고, 제외 마커와 키워드는
//! 원시 라인에 대한 단순 부분 문자열 검사입니다.
//!
//! | 계열   | 성공 마커    | 실패 마커                                    | 실패 제외       |
//! |--------|--------------|----------------------------------------------|-----------------|
//! | secure | `Accepted `  | `Failed password for`                        | `invalid user`  |
//! | auth   | `Accepted `  | `Connection closed by authenticating user`   | `invalid`       |
//!
//! 제외 마커는 실패 쪽에만 적용됩니다.

use std::fmt;

use regex::RegexSet;

use authpost_core::types::{LogFamily, OutcomeFilter};

use crate::error::LogSearchError;

/// 인증 성공 마커
pub const ACCEPTED_MARKER: &str = "Accepted ";
/// `secure` 계열 실패 마커
pub const FAILED_PASSWORD_MARKER: &str = "Failed password for";
/// `auth` 계열 실패 마커 (인증 전 연결 종료)
pub const CONNECTION_CLOSED_MARKER: &str = "Connection closed by authenticating user";
/// `secure` 계열 실패 제외 마커
pub const INVALID_USER_MARKER: &str = "invalid user";
/// `auth` 계열 실패 제외 마커
pub const INVALID_MARKER: &str = "invalid";

/// 계열의 실패 마커
pub fn failure_marker(family: LogFamily) -> &'static str {
    match family {
        LogFamily::Secure => FAILED_PASSWORD_MARKER,
        LogFamily::Auth => CONNECTION_CLOSED_MARKER,
    }
}

/// 계열의 실패 제외 마커
pub fn exclusion_marker(family: LogFamily) -> &'static str {
    match family {
        LogFamily::Secure => INVALID_USER_MARKER,
        LogFamily::Auth => INVALID_MARKER,
    }
}

/// 컴파일된 라인 필터
#[derive(Debug, Clone)]
pub struct LinePredicate {
    family: LogFamily,
    outcome: OutcomeFilter,
    markers: RegexSet,
    success_idx: Option<usize>,
    failure_idx: Option<usize>,
    exclusion: &'static str,
    keyword: Option<String>,
}

impl LinePredicate {
    /// 계열, 결과 필터, 키워드로 필터를 만듭니다. 빈 키워드는 필터 없음입니다.
    pub fn new(
        family: LogFamily,
        outcome: OutcomeFilter,
        keyword: Option<&str>,
    ) -> Result<Self, LogSearchError> {
        let mut patterns = Vec::with_capacity(2);
        let mut success_idx = None;
        let mut failure_idx = None;

        if matches!(outcome, OutcomeFilter::Any | OutcomeFilter::Success) {
            success_idx = Some(patterns.len());
            patterns.push(regex::escape(ACCEPTED_MARKER));
        }
        if matches!(outcome, OutcomeFilter::Any | OutcomeFilter::Failed) {
            failure_idx = Some(patterns.len());
            patterns.push(regex::escape(failure_marker(family)));
        }

        Ok(Self {
            family,
            outcome,
            markers: RegexSet::new(&patterns)?,
            success_idx,
            failure_idx,
            exclusion: exclusion_marker(family),
            keyword: keyword.filter(|k| !k.is_empty()).map(str::to_owned),
        })
    }

    /// 대상 계열
    pub fn family(&self) -> LogFamily {
        self.family
    }

    /// 라인이 필터를 통과하는지 검사합니다.
    pub fn matches(&self, line: &str) -> bool {
        if let Some(keyword) = &self.keyword {
            if !line.contains(keyword.as_str()) {
                return false;
            }
        }

        let hits = self.markers.matches(line);
        let success = self.success_idx.is_some_and(|i| hits.matched(i));
        let failure = self.failure_idx.is_some_and(|i| hits.matched(i))
            && !line.contains(self.exclusion);
        success || failure
    }

    /// 로그용 필터 요약
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LinePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family, self.outcome)?;
        if self.failure_idx.is_some() {
            write!(f, " -{:?}", self.exclusion)?;
        }
        if let Some(keyword) = &self.keyword {
            write!(f, " keyword={keyword:?}")?;
        }
        Ok(())
    }
}
