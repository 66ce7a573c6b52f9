//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! Logs go to stderr, so stdout carries only the rendered payload.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to an arbitrary writer.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Shorten `s` to at most `max` characters, marking the cut with `~`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}
