//! Logging initialization for the authpost CLI.
//!
//! Configures `tracing-subscriber` based on the `[general]` section
//! of `AuthpostConfig`. Logs are written to stderr so that stdout stays
//! reserved for command output.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use authpost_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// `RUST_LOG` takes precedence over `config.log_level`.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines (default)
/// * `"pretty"` - Human-readable colored output
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(())
}
