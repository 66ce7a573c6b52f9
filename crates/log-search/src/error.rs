//! 로그 검색 엔진 에러 타입
//!
//! [`LogSearchError`]는 엔진 내부에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<LogSearchError> for AuthpostError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **치명적**: `RootUnreadable`, `Query`, `Config`
//! - **파일 단위 (건너뜀)**: `Decompress`, `LineSource`
//! - **성능 저하만 유발**: `GeoDatabase`
//! - **런타임**: `Task`, `Io`, `Regex`

use authpost_core::error::{AuthpostError, ConfigError, SearchError};

/// 로그 검색 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogSearchError {
    /// 로그 루트 디렉토리를 열거할 수 없음
    #[error("log root unreadable: {path}: {source}")]
    RootUnreadable {
        /// 루트 경로
        path: String,
        /// 원본 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// `.gz` 아카이브 해제 실패
    #[error("decompress failed: {path}: {reason}")]
    Decompress {
        /// 아카이브 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 라인 소스 실행 실패
    #[error("line source failed: {path}: {reason}")]
    LineSource {
        /// 대상 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 지역 DB 로딩 실패
    #[error("geo database error: {path}: {reason}")]
    GeoDatabase {
        /// DB 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 유효하지 않은 질의
    #[error(transparent)]
    Query(#[from] SearchError),

    /// blocking 태스크 실행 실패
    #[error("task error: {0}")]
    Task(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 마커 정규식 컴파일 실패
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogSearchError> for AuthpostError {
    fn from(err: LogSearchError) -> Self {
        match err {
            LogSearchError::Query(e) => AuthpostError::Search(e),
            LogSearchError::RootUnreadable { path, source } => {
                AuthpostError::Search(SearchError::RootUnreadable {
                    path,
                    reason: source.to_string(),
                })
            }
            LogSearchError::Config { field, reason } => {
                AuthpostError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogSearchError::Io(e) => AuthpostError::Io(e),
            other => AuthpostError::Search(SearchError::Failed(other.to_string())),
        }
    }
}
