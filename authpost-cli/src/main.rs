//! authpost CLI 진입점
//!
//! 설정을 읽고 로깅을 초기화한 뒤 서브커맨드로 분기합니다.
//! 에러는 stderr에 출력하고 [`CliError::exit_code`]로 종료합니다.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use authpost_core::config::{AuthpostConfig, GeneralConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 설정 파일이 깨져 있어도 로깅은 켜 두고, 에러는 커맨드에서 보고
    let mut general = AuthpostConfig::load_or_default(&cli.config)
        .await
        .map(|c| c.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }

    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("error: {e}");
        return ExitCode::from(2);
    }

    tracing::debug!(config = %cli.config.display(), "authpost starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Search(args) => commands::search::execute(args, &cli.config, &writer).await,
        Commands::Files => commands::files::execute(&cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
