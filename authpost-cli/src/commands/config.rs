//! `authpost config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use authpost_core::config::AuthpostConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
const SECTIONS: [&str; 3] = ["general", "log_search", "geo"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if the file is missing, malformed or invalid.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match AuthpostConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is unknown.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = AuthpostConfig::load_or_default(config_path).await?;
    let report = build_report(config_path, &config, section)?;

    writer.render(&report)?;
    Ok(())
}

fn build_report(
    config_path: &Path,
    config: &AuthpostConfig,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("log_search") => toml::to_string_pretty(&config.log_search),
        Some("geo") => toml::to_string_pretty(&config.geo),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {})", e));

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml,
    })
}

/// Configuration display report.
///
/// The `config_toml` field is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
