//! 로그 검색 엔진 설정
//!
//! [`SearchConfig`]는 core의 [`AuthpostConfig`]에서
//! `[log_search]`, `[geo]` 섹션을 모아 엔진 고유 설정(최대 라인 길이)을 추가합니다.
//!
//! # 사용 예시
//!
//! ```
//! use authpost_log_search::SearchConfigBuilder;
//!
//! let config = SearchConfigBuilder::new()
//!     .log_root("/var/log")
//!     .timezone("Asia/Seoul")
//!     .geo_enabled(false)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Seoul);
//! ```

use std::path::{Component, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use authpost_core::config::{AuthpostConfig, MAX_PAGE_SIZE_LIMIT};

use crate::error::LogSearchError;

/// 한 라인의 최대 길이 기본값 (바이트)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

const MAX_LINE_LENGTH_LIMIT: usize = 16 * 1024 * 1024;

/// 로그 검색 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// 탐색 루트 디렉토리
    pub log_root: PathBuf,
    /// IANA 시간대 이름
    pub timezone: String,
    /// 짝 없는 `.gz` 아카이브를 해제할지 여부
    pub decompress_archives: bool,
    /// 질의 데드라인 (초, 0이면 무제한)
    pub query_timeout_secs: u64,
    /// 허용하는 최대 페이지 크기
    pub max_page_size: u32,

    // --- 모듈 고유 확장 ---
    /// 이보다 긴 라인은 필터 전에 버립니다 (바이트)
    pub max_line_length: usize,
    /// 지역 조회 활성화 여부
    pub geo_enabled: bool,
    /// MaxMind DB 경로
    pub geo_database_path: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_core(&AuthpostConfig::default())
    }
}

impl SearchConfig {
    /// core 설정에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &AuthpostConfig) -> Self {
        Self {
            log_root: PathBuf::from(&core.log_search.log_root),
            timezone: core.log_search.timezone.clone(),
            decompress_archives: core.log_search.decompress_archives,
            query_timeout_secs: core.log_search.query_timeout_secs,
            max_page_size: core.log_search.max_page_size,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            geo_enabled: core.geo.enabled,
            geo_database_path: PathBuf::from(&core.geo.database_path),
        }
    }

    /// 설정된 시간대를 해석합니다.
    pub fn timezone(&self) -> Result<Tz, LogSearchError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| LogSearchError::Config {
                field: "timezone".to_owned(),
                reason: format!("unknown IANA time zone '{}': {e}", self.timezone),
            })
    }

    /// 질의 데드라인. 0이면 `None`
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_secs > 0).then(|| Duration::from_secs(self.query_timeout_secs))
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `log_root`: 절대 경로, `..` 금지
    /// - `timezone`: IANA 시간대 이름
    /// - `max_page_size`: 1-100000
    /// - `max_line_length`: 1-16MB
    /// - `geo_database_path`: 활성화 시 비어있으면 안 됨
    pub fn validate(&self) -> Result<(), LogSearchError> {
        if !self.log_root.is_absolute() {
            return Err(LogSearchError::Config {
                field: "log_root".to_owned(),
                reason: format!(
                    "log root '{}' must be an absolute path",
                    self.log_root.display()
                ),
            });
        }

        if self
            .log_root
            .components()
            .any(|c| c == Component::ParentDir)
        {
            return Err(LogSearchError::Config {
                field: "log_root".to_owned(),
                reason: "log root contains path traversal pattern '..'".to_owned(),
            });
        }

        self.timezone()?;

        if self.max_page_size == 0 || self.max_page_size > MAX_PAGE_SIZE_LIMIT {
            return Err(LogSearchError::Config {
                field: "max_page_size".to_owned(),
                reason: format!("must be 1-{MAX_PAGE_SIZE_LIMIT}"),
            });
        }

        if self.max_line_length == 0 || self.max_line_length > MAX_LINE_LENGTH_LIMIT {
            return Err(LogSearchError::Config {
                field: "max_line_length".to_owned(),
                reason: format!("must be 1-{MAX_LINE_LENGTH_LIMIT}"),
            });
        }

        if self.geo_enabled && self.geo_database_path.as_os_str().is_empty() {
            return Err(LogSearchError::Config {
                field: "geo_database_path".to_owned(),
                reason: "geo database path must not be empty when enabled".to_owned(),
            });
        }

        Ok(())
    }
}

/// [`SearchConfig`] 빌더
#[derive(Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 탐색 루트를 설정합니다.
    pub fn log_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.log_root = root.into();
        self
    }

    /// 시간대를 설정합니다.
    pub fn timezone(mut self, tz: impl Into<String>) -> Self {
        self.config.timezone = tz.into();
        self
    }

    /// 아카이브 해제 여부를 설정합니다.
    pub fn decompress_archives(mut self, enabled: bool) -> Self {
        self.config.decompress_archives = enabled;
        self
    }

    /// 질의 데드라인(초)을 설정합니다.
    pub fn query_timeout_secs(mut self, secs: u64) -> Self {
        self.config.query_timeout_secs = secs;
        self
    }

    /// 최대 페이지 크기를 설정합니다.
    pub fn max_page_size(mut self, size: u32) -> Self {
        self.config.max_page_size = size;
        self
    }

    /// 최대 라인 길이(바이트)를 설정합니다.
    pub fn max_line_length(mut self, len: usize) -> Self {
        self.config.max_line_length = len;
        self
    }

    /// 지역 조회 활성화 여부를 설정합니다.
    pub fn geo_enabled(mut self, enabled: bool) -> Self {
        self.config.geo_enabled = enabled;
        self
    }

    /// MaxMind DB 경로를 설정합니다.
    pub fn geo_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.geo_database_path = path.into();
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `LogSearchError::Config` 반환
    pub fn build(self) -> Result<SearchConfig, LogSearchError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
