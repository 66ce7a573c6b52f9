//! 에러 타입 — 도메인별 에러 정의

/// authpost 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AuthpostError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 검색 에러
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 검색 에러
///
/// 질의 전체를 중단시키는 치명적 에러만 표현합니다.
/// 파일 단위 실패(압축 해제, 라인 소스)는 에러가 아니라
/// [`SkippedFile`](crate::types::SkippedFile)로 결과에 기록됩니다.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// 유효하지 않은 검색 질의 (page 0, page_size 범위 초과 등)
    #[error("invalid query: {field}: {reason}")]
    InvalidQuery { field: String, reason: String },

    /// 로그 루트 디렉토리를 열거할 수 없음
    #[error("log root unreadable: {path}: {reason}")]
    RootUnreadable { path: String, reason: String },

    /// 그 밖의 검색 실패 (태스크 조인 실패 등)
    #[error("search failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_query_display() {
        let err = SearchError::InvalidQuery {
            field: "page".to_owned(),
            reason: "must be at least 1".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("page"));
        assert!(msg.contains("at least 1"));
    }

    #[test]
    fn search_error_converts_to_authpost_error() {
        let err: AuthpostError = SearchError::Failed("join error".to_owned()).into();
        assert!(matches!(err, AuthpostError::Search(SearchError::Failed(_))));
    }

    #[test]
    fn config_error_display_includes_field() {
        let err = ConfigError::InvalidValue {
            field: "log_search.timezone".to_owned(),
            reason: "unknown zone".to_owned(),
        };
        assert!(err.to_string().contains("log_search.timezone"));
    }
}
