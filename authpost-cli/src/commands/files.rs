//! `authpost files` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use authpost_core::types::{LogFamily, SkippedFile};
use authpost_log_search::{Discovery, LogFileRef};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `files` command.
///
/// Runs discovery (including archive decompression) and lists files in the
/// order a search would scan them.
pub async fn execute(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let engine = super::build_engine(config_path).await?;
    let root = engine.config().log_root.display().to_string();

    info!(root = %root, "listing log files");
    let discovery = engine.list_files().await?;

    writer.render(&FilesReport::new(root, discovery))?;
    Ok(())
}

/// One file in processing order.
#[derive(Serialize)]
pub struct FileEntry {
    pub path: String,
    pub family: LogFamily,
    pub rotation_year: i32,
}

impl From<&LogFileRef> for FileEntry {
    fn from(file: &LogFileRef) -> Self {
        Self {
            path: file.path.display().to_string(),
            family: file.family,
            rotation_year: file.rotation_year,
        }
    }
}

/// Discovery output.
#[derive(Serialize)]
pub struct FilesReport {
    pub root: String,
    pub files: Vec<FileEntry>,
    pub skipped_files: Vec<SkippedFile>,
    pub decompressed: u64,
}

impl FilesReport {
    pub fn new(root: String, discovery: Discovery) -> Self {
        Self {
            root,
            files: discovery.files.iter().map(FileEntry::from).collect(),
            skipped_files: discovery.skipped,
            decompressed: discovery.decompressed,
        }
    }
}

impl Render for FilesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Log files under {} (processing order)", self.root.bold())?;
        if self.decompressed > 0 {
            writeln!(w, "  Decompressed archives: {}", self.decompressed)?;
        }
        writeln!(w)?;

        if self.files.is_empty() {
            writeln!(w, "No secure* or auth.log* files found.")?;
        } else {
            writeln!(w, "{:>3}  {:<7} {:<5} {}", "#", "FAMILY", "YEAR", "PATH")?;
            for (idx, file) in self.files.iter().enumerate() {
                writeln!(
                    w,
                    "{:>3}  {:<7} {:<5} {}",
                    idx + 1,
                    file.family.as_str(),
                    file.rotation_year,
                    file.path
                )?;
            }
        }

        if !self.skipped_files.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", "Skipped:".yellow().bold())?;
            for skipped in &self.skipped_files {
                writeln!(
                    w,
                    "  {} [{}] {}",
                    skipped.path.display(),
                    skipped.reason,
                    skipped.detail
                )?;
            }
        }

        Ok(())
    }
}
