mod cli;
mod error;
mod sync;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tap_tiktok_core::{streams, ReqwestHttpClient, TapConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "sync failed");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.list_streams {
        let mut stdout = std::io::stdout().lock();
        for name in streams::STREAM_NAMES {
            writeln!(stdout, "{name}")?;
        }
        return Ok(());
    }

    let Some(path) = cli.config.as_deref() else {
        return Err(tap_tiktok_core::TapError::config("--config is required").into());
    };
    let config = Arc::new(TapConfig::from_path(path)?);
    let http_client = Arc::new(ReqwestHttpClient::new());

    let written = sync::run(config, &cli.streams, http_client, std::io::stdout().lock()).await?;
    info!(records = written, "sync finished");
    Ok(())
}
