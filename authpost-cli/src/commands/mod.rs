//! Command handlers -- one module per subcommand

pub mod config;
pub mod files;
pub mod search;

use std::path::Path;

use authpost_core::config::AuthpostConfig;
use authpost_log_search::{LogSearchEngine, SearchConfig};

use crate::error::CliError;

/// Load the configuration and build an engine from its `[log_search]` and `[geo]` sections.
///
/// A missing config file falls back to defaults.
pub(crate) async fn build_engine(config_path: &Path) -> Result<LogSearchEngine, CliError> {
    let config = AuthpostConfig::load_or_default(config_path).await?;
    let search_config = SearchConfig::from_core(&config);

    Ok(LogSearchEngine::builder().config(search_config).build()?)
}
