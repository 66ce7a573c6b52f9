//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// authpost -- SSH authentication log search.
///
/// Use `authpost <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "authpost", version, about, long_about = None)]
pub struct Cli {
    /// Path to the authpost.toml configuration file.
    #[arg(short, long, default_value = "authpost.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search SSH authentication events.
    Search(SearchArgs),

    /// List log files in processing order.
    Files,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- search ----

/// Run one paginated query over the log root.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Substring that must appear in the raw log line.
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Outcome filter (any, success, failed).
    #[arg(short, long, default_value = "any")]
    pub status: String,

    /// Page number, starting at 1.
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Events per page.
    #[arg(long, default_value_t = 10)]
    pub page_size: u32,
}

// ---- config ----

/// Manage authpost configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, log_search, geo).
        #[arg(long)]
        section: Option<String>,
    },
}
