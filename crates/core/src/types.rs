//! 도메인 타입 — 인증 로그 검색 전역에서 사용되는 공통 타입
//!
//! 모든 값은 질의 한 번의 실행이 소유하며, 질의가 끝나면 버려집니다.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// 로그 파일 계열
///
/// 파일 이름 접두어로 구분하며, 계열마다 라인 형식과 마커, 처리 순서가 다릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFamily {
    /// RHEL/CentOS 계열 (`secure`, `secure-20240107`, ...)
    Secure,
    /// Debian/Ubuntu 계열 (`auth.log`, `auth.log.1`, ...)
    Auth,
}

impl LogFamily {
    /// `secure` 계열 파일 이름 접두어
    pub const SECURE_PREFIX: &'static str = "secure";
    /// `auth` 계열 파일 이름 접두어
    pub const AUTH_PREFIX: &'static str = "auth.log";

    /// 파일 이름에서 계열을 판별합니다. 어느 접두어와도 맞지 않으면 `None`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.starts_with(Self::SECURE_PREFIX) {
            Some(Self::Secure)
        } else if name.starts_with(Self::AUTH_PREFIX) {
            Some(Self::Auth)
        } else {
            None
        }
    }

    /// 계열 이름 (`secure` 또는 `auth`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Auth => "auth",
        }
    }
}

impl fmt::Display for LogFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인증 시도 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// 인증 성공
    #[serde(rename = "success")]
    Success,
    /// 인증 실패
    #[serde(rename = "failed")]
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 검색 질의의 결과 필터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeFilter {
    /// 성공과 실패 모두
    #[default]
    Any,
    /// 성공만
    Success,
    /// 실패만
    Failed,
}

impl OutcomeFilter {
    /// 주어진 결과가 필터를 통과하는지 확인합니다.
    pub fn accepts(&self, outcome: Outcome) -> bool {
        match self {
            Self::Any => true,
            Self::Success => outcome == Outcome::Success,
            Self::Failed => outcome == Outcome::Failure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OutcomeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeFilter {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" | "all" | "" => Ok(Self::Any),
            "success" => Ok(Self::Success),
            "failed" | "failure" => Ok(Self::Failed),
            other => Err(SearchError::InvalidQuery {
                field: "outcome".to_owned(),
                reason: format!("unknown outcome filter '{other}' (expected: any, success, failed)"),
            }),
        }
    }
}

/// 파싱된 SSH 인증 이벤트
///
/// 원시 로그 라인 하나에서 생성됩니다. `area`는 페이지 윈도우 안에 들어
/// 실체화된 이벤트에만 채워집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEvent {
    /// 설정된 시간대 기준으로 복원한 시각. 복원 실패 시 `None`.
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// 라인 앞 세 토큰 (예: `Jan 2 03:04:05`)
    pub raw_date: String,
    /// 로그인 사용자
    pub user: String,
    /// 접속 출발지 주소
    pub address: String,
    /// 접속 출발지 포트
    pub port: String,
    /// 인증 방식 (password, publickey 등)
    pub auth_method: String,
    /// 인증 결과
    pub outcome: Outcome,
    /// 실패 라인의 메시지 본문
    pub message: String,
    /// 지역 라벨 (조회 실패 시 빈 문자열)
    pub area: String,
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}@{}:{} ({})",
            self.outcome, self.raw_date, self.user, self.address, self.port, self.auth_method,
        )
    }
}

/// 검색 질의
///
/// 호출자가 만들어 넘기며 실행 중에는 바뀌지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// 원시 라인에 대한 부분 문자열 필터
    pub keyword: Option<String>,
    /// 결과 필터
    pub outcome: OutcomeFilter,
    /// 페이지 번호 (1부터)
    pub page: u32,
    /// 페이지 크기
    pub page_size: u32,
}

impl SearchQuery {
    /// 필터 없는 질의를 생성합니다.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            keyword: None,
            outcome: OutcomeFilter::Any,
            page,
            page_size,
        }
    }

    /// 키워드 필터를 설정합니다. 빈 문자열은 필터 없음으로 취급합니다.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.keyword = if keyword.is_empty() {
            None
        } else {
            Some(keyword)
        };
        self
    }

    /// 결과 필터를 설정합니다.
    pub fn with_outcome(mut self, outcome: OutcomeFilter) -> Self {
        self.outcome = outcome;
        self
    }

    /// 질의 값의 유효성을 검증합니다.
    pub fn validate(&self, max_page_size: u32) -> Result<(), SearchError> {
        if self.page == 0 {
            return Err(SearchError::InvalidQuery {
                field: "page".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        if self.page_size == 0 || self.page_size > max_page_size {
            return Err(SearchError::InvalidQuery {
                field: "page_size".to_owned(),
                reason: format!("must be 1-{max_page_size}"),
            });
        }

        Ok(())
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// 파일이 결과에서 제외된 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 압축된 로테이션 파일의 해제 실패
    Decompress,
    /// 라인 소스 실행 실패 (읽기 에러 등)
    LineSource,
    /// 하위 디렉토리 열거 실패
    UnreadableDir,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decompress => "decompress",
            Self::LineSource => "line_source",
            Self::UnreadableDir => "unreadable_dir",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 복구 가능한 실패로 제외된 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// 파일 또는 디렉토리 경로
    pub path: PathBuf,
    /// 제외 사유
    pub reason: SkipReason,
    /// 상세 메시지
    pub detail: String,
}

impl SkippedFile {
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason, detail: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason,
            detail: detail.into(),
        }
    }
}

/// 검색 결과
///
/// 불변식: `total_count == successful_count + failed_count`,
/// `events.len() <= page_size`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 현재 페이지의 이벤트 (최신순)
    pub events: Vec<AuthEvent>,
    /// 매칭된 전체 이벤트 수
    pub total_count: u64,
    /// 성공 이벤트 수
    pub successful_count: u64,
    /// 실패 이벤트 수
    pub failed_count: u64,
    /// 복구 가능한 실패로 제외된 파일
    pub skipped_files: Vec<SkippedFile>,
    /// 취소/데드라인으로 중간에 멈춘 결과인지 여부
    pub partial: bool,
}

impl SearchResult {
    /// 이벤트가 하나도 매칭되지 않았는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}
