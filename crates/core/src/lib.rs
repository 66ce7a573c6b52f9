#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod geo;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{AuthpostError, ConfigError, SearchError};

// 설정
pub use config::AuthpostConfig;

// 지역 조회 trait
pub use geo::GeoLookup;

// 도메인 타입
pub use types::{
    AuthEvent, LogFamily, Outcome, OutcomeFilter, SearchQuery, SearchResult, SkipReason,
    SkippedFile,
};
