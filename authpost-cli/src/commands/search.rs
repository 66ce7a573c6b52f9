//! `authpost search` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use authpost_core::types::{AuthEvent, Outcome, OutcomeFilter, SearchQuery, SearchResult};
use authpost_log_search::CancellationToken;

use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, truncate};

/// Execute the `search` command.
///
/// Ctrl-C cancels the query; whatever was collected so far is rendered
/// with `partial` set.
pub async fn execute(
    args: SearchArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let query = build_query(&args)?;
    let engine = super::build_engine(config_path).await?;

    info!(
        root = %engine.config().log_root.display(),
        page = query.page,
        page_size = query.page_size,
        outcome = %query.outcome,
        geo = engine.has_geo(),
        "running search"
    );

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling search");
                cancel.cancel();
            }
        })
    };

    let result = engine.search_with_cancel(query.clone(), cancel).await;
    interrupt.abort();

    let report = SearchReport::new(query, result?);
    writer.render(&report)?;

    Ok(())
}

fn build_query(args: &SearchArgs) -> Result<SearchQuery, CliError> {
    let outcome: OutcomeFilter = args
        .status
        .parse()
        .map_err(|e: authpost_core::error::SearchError| CliError::Command(e.to_string()))?;

    let mut query = SearchQuery::new(args.page, args.page_size).with_outcome(outcome);
    if let Some(keyword) = &args.keyword {
        query = query.with_keyword(keyword.as_str());
    }
    Ok(query)
}

/// Search output: the query echoed back plus the engine result.
#[derive(Serialize)]
pub struct SearchReport {
    pub query: SearchQuery,
    #[serde(flatten)]
    pub result: SearchResult,
}

impl SearchReport {
    pub fn new(query: SearchQuery, result: SearchResult) -> Self {
        Self { query, result }
    }

    fn total_pages(&self) -> u64 {
        self.result
            .total_count
            .div_ceil(u64::from(self.query.page_size.max(1)))
    }
}

fn event_time(event: &AuthEvent) -> String {
    match event.timestamp {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S %:z").to_string(),
        None => event.raw_date.clone(),
    }
}

impl Render for SearchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let result = &self.result;
        writeln!(
            w,
            "{} {} matched ({} {}, {} {})  page {}/{}",
            "Search:".bold(),
            result.total_count,
            result.successful_count.to_string().green(),
            "success",
            result.failed_count.to_string().red(),
            "failed",
            self.query.page,
            self.total_pages().max(1),
        )?;

        if let Some(keyword) = &self.query.keyword {
            writeln!(w, "  Keyword: {}", keyword)?;
        }
        if self.query.outcome != OutcomeFilter::Any {
            writeln!(w, "  Status:  {}", self.query.outcome)?;
        }
        writeln!(w)?;

        if result.events.is_empty() {
            writeln!(w, "No events on this page.")?;
        } else {
            writeln!(
                w,
                "{:<26} {:<8} {:<16} {:<39} {:<6} {:<10} {}",
                "TIME", "RESULT", "USER", "ADDRESS", "PORT", "METHOD", "AREA"
            )?;
            writeln!(w, "{}", "-".repeat(120))?;

            for event in &result.events {
                let outcome = match event.outcome {
                    Outcome::Success => format!("{:<8}", "success").green(),
                    Outcome::Failure => format!("{:<8}", "failed").red(),
                };
                writeln!(
                    w,
                    "{:<26} {} {:<16} {:<39} {:<6} {:<10} {}",
                    event_time(event),
                    outcome,
                    truncate(&event.user, 16),
                    event.address,
                    event.port,
                    truncate(&event.auth_method, 10),
                    event.area,
                )?;
            }
        }

        if !result.skipped_files.is_empty() {
            writeln!(w)?;
            writeln!(w, "{} {}", "Skipped files:".yellow().bold(), result.skipped_files.len())?;
            for skipped in &result.skipped_files {
                writeln!(
                    w,
                    "  {} [{}] {}",
                    skipped.path.display(),
                    skipped.reason.as_str(),
                    skipped.detail
                )?;
            }
        }

        if result.partial {
            writeln!(w)?;
            writeln!(
                w,
                "{}",
                "Result is partial: the search was cancelled or hit its deadline."
                    .yellow()
                    .bold()
            )?;
        }

        Ok(())
    }
}
