use clap::Parser;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use lucky_slip::{
    AppConfig,
    config::Cli,
};
use std::{
    path::Path,
    sync::OnceLock,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod client;
mod ui;

const LOG_FILE_PREFIX: &str = "lucky-slip.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// The terminal belongs to the UI, so logs go to a daily rolling file.
fn init_tracing(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("failed to create log dir {}", log_dir.display()))?;
    let appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = AppConfig::from_cli(Cli::parse())?;
    init_tracing(&config.log_dir)?;
    tracing::info!(
        initial_balance = config.initial_balance,
        seed = ?config.seed,
        "starting lucky-slip"
    );
    client::run_app(config).await
}
