//! CLI-specific error types and exit code mapping

use authpost_core::error::AuthpostError;
use authpost_log_search::LogSearchError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The search could not run.
    #[error("search error: {0}")]
    Search(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from authpost-core.
    #[error("{0}")]
    Core(#[from] AuthpostError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                 |
    /// |------|-------------------------|
    /// | 0    | Success                 |
    /// | 1    | General / command error |
    /// | 2    | Configuration error     |
    /// | 3    | Search error            |
    /// | 10   | IO error                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Search(_) => 3,
            Self::Io(_) => 10,
            Self::Core(AuthpostError::Config(_)) => 2,
            Self::Core(AuthpostError::Search(_)) => 3,
            Self::Core(AuthpostError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<LogSearchError> for CliError {
    fn from(e: LogSearchError) -> Self {
        Self::Core(e.into())
    }
}
