//! 설정 관리 — authpost.toml 파싱 및 런타임 설정
//!
//! [`AuthpostConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//! 엔진은 전역 상태를 읽지 않고, 이 구조체에서 파생된 설정을 주입받습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`AUTHPOST_LOG_SEARCH_TIMEZONE=Asia/Seoul` 형식)
//! 3. 설정 파일 (`authpost.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), authpost_core::error::AuthpostError> {
//! use authpost_core::config::AuthpostConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = AuthpostConfig::load("authpost.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = AuthpostConfig::parse("[log_search]\ntimezone = \"Asia/Seoul\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AuthpostError, ConfigError};

/// 페이지 크기 상한의 최댓값
pub const MAX_PAGE_SIZE_LIMIT: u32 = 100_000;

/// authpost 통합 설정
///
/// `authpost.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthpostConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 검색 엔진 설정
    #[serde(default)]
    pub log_search: LogSearchConfig,
    /// 지역 조회 설정
    #[serde(default)]
    pub geo: GeoConfig,
}

impl AuthpostConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AuthpostError> {
        let mut config = Self::read_file(path.as_ref()).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값으로 대체하여 로드합니다.
    ///
    /// 설정 파일 없이도 CLI를 쓸 수 있도록 하기 위한 진입점입니다.
    /// 파일이 있는데 파싱에 실패하면 에러를 그대로 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, AuthpostError> {
        let mut config = match Self::read_file(path.as_ref()).await {
            Ok(config) => config,
            Err(AuthpostError::Config(ConfigError::FileNotFound { .. })) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthpostError> {
        let config = Self::read_file(path.as_ref()).await?;
        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Self, AuthpostError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AuthpostError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AuthpostError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, AuthpostError> {
        toml::from_str(toml_str).map_err(|e| {
            AuthpostError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `AUTHPOST_{SECTION}_{FIELD}`
    /// 예: `AUTHPOST_LOG_SEARCH_LOG_ROOT=/srv/logs`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "AUTHPOST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "AUTHPOST_GENERAL_LOG_FORMAT");

        // Log Search
        override_string(
            &mut self.log_search.log_root,
            "AUTHPOST_LOG_SEARCH_LOG_ROOT",
        );
        override_string(
            &mut self.log_search.timezone,
            "AUTHPOST_LOG_SEARCH_TIMEZONE",
        );
        override_bool(
            &mut self.log_search.decompress_archives,
            "AUTHPOST_LOG_SEARCH_DECOMPRESS_ARCHIVES",
        );
        override_u64(
            &mut self.log_search.query_timeout_secs,
            "AUTHPOST_LOG_SEARCH_QUERY_TIMEOUT_SECS",
        );
        override_u32(
            &mut self.log_search.max_page_size,
            "AUTHPOST_LOG_SEARCH_MAX_PAGE_SIZE",
        );

        // Geo
        override_bool(&mut self.geo.enabled, "AUTHPOST_GEO_ENABLED");
        override_string(&mut self.geo.database_path, "AUTHPOST_GEO_DATABASE_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AuthpostError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        validate_log_root(&self.log_search.log_root)?;

        if self.log_search.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "log_search.timezone".to_owned(),
                reason: format!(
                    "unknown IANA time zone '{}'",
                    self.log_search.timezone
                ),
            }
            .into());
        }

        if self.log_search.max_page_size == 0
            || self.log_search.max_page_size > MAX_PAGE_SIZE_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "log_search.max_page_size".to_owned(),
                reason: format!("must be 1-{MAX_PAGE_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.geo.enabled && self.geo.database_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "geo.database_path".to_owned(),
                reason: "database path must not be empty when geo is enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 로그 루트 경로 검증 (절대 경로, `..` 금지)
fn validate_log_root(log_root: &str) -> Result<(), ConfigError> {
    if log_root.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "log_search.log_root".to_owned(),
            reason: "log root must not be empty".to_owned(),
        });
    }

    let path = Path::new(log_root);

    if path.components().any(|c| c == Component::ParentDir) {
        return Err(ConfigError::InvalidValue {
            field: "log_search.log_root".to_owned(),
            reason: format!("log root '{log_root}' contains path traversal pattern '..'"),
        });
    }

    if !path.is_absolute() {
        return Err(ConfigError::InvalidValue {
            field: "log_search.log_root".to_owned(),
            reason: format!("log root '{log_root}' must be an absolute path"),
        });
    }

    Ok(())
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 로그 검색 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSearchConfig {
    /// 로테이션된 인증 로그가 위치한 루트 디렉토리
    pub log_root: String,
    /// 연도 없는 syslog 타임스탬프를 해석할 IANA 시간대
    pub timezone: String,
    /// `.gz` 로테이션 파일을 제자리에서 해제할지 여부
    pub decompress_archives: bool,
    /// 질의 데드라인 (초, 0이면 무제한)
    pub query_timeout_secs: u64,
    /// 허용하는 최대 페이지 크기
    pub max_page_size: u32,
}

impl Default for LogSearchConfig {
    fn default() -> Self {
        Self {
            log_root: "/var/log".to_owned(),
            timezone: "UTC".to_owned(),
            decompress_archives: true,
            query_timeout_secs: 0,
            max_page_size: 1000,
        }
    }
}

/// 지역 조회 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// MaxMind DB (`.mmdb`) 파일 경로
    pub database_path: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: "/usr/share/GeoIP/GeoLite2-City.mmdb".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
