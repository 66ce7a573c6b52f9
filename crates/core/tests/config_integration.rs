//! authpost.toml 통합 설정 테스트
//!
//! - authpost.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use authpost_core::config::AuthpostConfig;
use authpost_core::error::{AuthpostError, ConfigError};

const EXAMPLE: &str = include_str!("../../../authpost.toml.example");

// =============================================================================
// authpost.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = AuthpostConfig::parse(EXAMPLE).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.log_search.log_root, "/var/log");
    assert_eq!(config.log_search.timezone, "UTC");
}

#[test]
fn example_config_passes_validation() {
    let config = AuthpostConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let from_file = AuthpostConfig::parse(EXAMPLE).expect("should parse");
    let from_code = AuthpostConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);

    assert_eq!(from_file.log_search.log_root, from_code.log_search.log_root);
    assert_eq!(from_file.log_search.timezone, from_code.log_search.timezone);
    assert_eq!(
        from_file.log_search.decompress_archives,
        from_code.log_search.decompress_archives
    );
    assert_eq!(
        from_file.log_search.query_timeout_secs,
        from_code.log_search.query_timeout_secs
    );
    assert_eq!(
        from_file.log_search.max_page_size,
        from_code.log_search.max_page_size
    );

    assert_eq!(from_file.geo.enabled, from_code.geo.enabled);
    assert_eq!(from_file.geo.database_path, from_code.geo.database_path);
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_general_only() {
    let toml = r#"
[general]
log_level = "debug"
log_format = "pretty"
"#;
    let config = AuthpostConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "pretty");
    // 나머지 섹션은 기본값
    assert_eq!(config.log_search.log_root, "/var/log");
    assert!(config.geo.enabled);
}

#[test]
fn partial_config_log_search_only() {
    let toml = r#"
[log_search]
log_root = "/srv/ssh-logs"
timezone = "Asia/Seoul"
query_timeout_secs = 30
"#;
    let config = AuthpostConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.log_search.log_root, "/srv/ssh-logs");
    assert_eq!(config.log_search.timezone, "Asia/Seoul");
    assert_eq!(config.log_search.query_timeout_secs, 30);
    assert!(config.log_search.decompress_archives);
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn partial_config_geo_disabled() {
    let toml = r#"
[geo]
enabled = false
database_path = ""
"#;
    let config = AuthpostConfig::parse(toml).expect("should parse");
    config.validate().expect("disabled geo needs no database");
    assert!(!config.geo.enabled);
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[log_search]
timezone = "UTC"
"#;

    let original = std::env::var("AUTHPOST_LOG_SEARCH_TIMEZONE").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("AUTHPOST_LOG_SEARCH_TIMEZONE", "America/New_York");
    }

    let mut config = AuthpostConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.log_search.timezone.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("AUTHPOST_LOG_SEARCH_TIMEZONE", val),
            None => std::env::remove_var("AUTHPOST_LOG_SEARCH_TIMEZONE"),
        }
    }

    assert_eq!(result, "America/New_York");
}

#[test]
#[serial_test::serial]
fn env_override_bool_field() {
    let original = std::env::var("AUTHPOST_LOG_SEARCH_DECOMPRESS_ARCHIVES").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("AUTHPOST_LOG_SEARCH_DECOMPRESS_ARCHIVES", "false");
    }

    let mut config = AuthpostConfig::default();
    config.apply_env_overrides();
    let result = config.log_search.decompress_archives;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("AUTHPOST_LOG_SEARCH_DECOMPRESS_ARCHIVES", val),
            None => std::env::remove_var("AUTHPOST_LOG_SEARCH_DECOMPRESS_ARCHIVES"),
        }
    }

    assert!(!result);
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let original = std::env::var("AUTHPOST_LOG_SEARCH_MAX_PAGE_SIZE").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("AUTHPOST_LOG_SEARCH_MAX_PAGE_SIZE", "250");
    }

    let mut config = AuthpostConfig::default();
    config.apply_env_overrides();
    let result = config.log_search.max_page_size;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("AUTHPOST_LOG_SEARCH_MAX_PAGE_SIZE", val),
            None => std::env::remove_var("AUTHPOST_LOG_SEARCH_MAX_PAGE_SIZE"),
        }
    }

    assert_eq!(result, 250);
}

#[test]
#[serial_test::serial]
fn env_override_invalid_numeric_keeps_toml_value() {
    let toml = r#"
[log_search]
query_timeout_secs = 15
"#;
    let original = std::env::var("AUTHPOST_LOG_SEARCH_QUERY_TIMEOUT_SECS").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("AUTHPOST_LOG_SEARCH_QUERY_TIMEOUT_SECS", "soon");
    }

    let mut config = AuthpostConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.log_search.query_timeout_secs;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("AUTHPOST_LOG_SEARCH_QUERY_TIMEOUT_SECS", val),
            None => std::env::remove_var("AUTHPOST_LOG_SEARCH_QUERY_TIMEOUT_SECS"),
        }
    }

    assert_eq!(result, 15);
}

// =============================================================================
// 에러 케이스 테스트
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = AuthpostConfig::parse("").expect("empty should parse");
    assert_eq!(config.log_search.max_page_size, 1000);
}

#[test]
fn comments_only_parses_with_defaults() {
    let config = AuthpostConfig::parse("# nothing here\n# still nothing\n").expect("should parse");
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = AuthpostConfig::parse("[log_search\nlog_root = ");
    assert!(matches!(
        result.unwrap_err(),
        AuthpostError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[log_search]
max_page_size = "lots"
"#;
    assert!(AuthpostConfig::parse(toml).is_err());
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[dashboard]
port = 8080

[log_search]
timezone = "Asia/Tokyo"
"#;
    let config = AuthpostConfig::parse(toml).expect("unknown sections should be ignored");
    assert_eq!(config.log_search.timezone, "Asia/Tokyo");
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let result = AuthpostConfig::from_file("/tmp/authpost_test_nonexistent_12345.toml").await;
    assert!(matches!(
        result.unwrap_err(),
        AuthpostError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn from_file_reads_written_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("authpost.toml");
    std::fs::write(
        &path,
        "[log_search]\nlog_root = \"/srv/auth\"\nmax_page_size = 50\n",
    )
    .expect("write config");

    let config = AuthpostConfig::from_file(&path).await.expect("should load");
    assert_eq!(config.log_search.log_root, "/srv/auth");
    assert_eq!(config.log_search.max_page_size, 50);
}

#[tokio::test]
async fn from_file_rejects_invalid_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("authpost.toml");
    std::fs::write(&path, "[log_search]\ntimezone = \"Nowhere/Special\"\n").expect("write");

    let err = AuthpostConfig::from_file(&path).await.unwrap_err();
    assert!(matches!(
        err,
        AuthpostError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 직렬화 라운드트립 테스트
// =============================================================================

#[test]
fn example_config_serialize_roundtrip() {
    let config = AuthpostConfig::parse(EXAMPLE).expect("should parse");
    let serialized = toml::to_string_pretty(&config).expect("should serialize");
    let reparsed = AuthpostConfig::parse(&serialized).expect("should reparse");
    assert_eq!(config.log_search.timezone, reparsed.log_search.timezone);
    assert_eq!(config.geo.database_path, reparsed.geo.database_path);
}
