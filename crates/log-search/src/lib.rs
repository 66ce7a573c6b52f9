#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`LogSearchError`)
//! - [`config`]: Engine configuration (`SearchConfig`, builder)
//! - [`discovery`]: Log root walk and in-place archive decompression (`FileDiscoverer`)
//! - [`ordering`]: Per-family processing order
//! - [`filter`]: Outcome/keyword line predicates (`LinePredicate`)
//! - [`source`]: Line producers (`LineSource` trait, `FileLineSource`)
//! - [`parser`]: Line classification, field extraction, timestamp reconstruction
//! - [`window`]: Cross-file pagination window (`PageWindow`)
//! - [`geo`]: MaxMind DB area lookup (`GeoDatabase`)
//! - [`aggregate`]: Per-file tallies and result assembly
//! - [`engine`]: Main orchestrator (`LogSearchEngine`, `LogSearchEngineBuilder`)

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod filter;
pub mod geo;
pub mod ordering;
pub mod parser;
pub mod source;
pub mod window;

// --- Public API Re-exports ---

// Engine (main orchestrator)
pub use engine::{LogSearchEngine, LogSearchEngineBuilder};

// Configuration
pub use config::{SearchConfig, SearchConfigBuilder};

// Error
pub use error::LogSearchError;

// Discovery
pub use discovery::{Discovery, FileDiscoverer, LogFileRef};

// Filtering and parsing
pub use filter::LinePredicate;
pub use parser::{LineShape, ParsedLine, TimestampResolver, parse_line};
pub use source::{FileLineSource, LineSource};

// Geo
pub use geo::GeoDatabase;

// Re-export for callers that only depend on this crate
pub use tokio_util::sync::CancellationToken;
