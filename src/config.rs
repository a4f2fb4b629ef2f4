use crate::{
    advisor::{
        Advisor,
        DEFAULT_ADVISOR_URL,
        DEFAULT_MODEL,
        GeminiAdvisor,
        StaticAdvisor,
    },
    icons::INITIAL_BALANCE,
};
use clap::Parser;
use color_eyre::eyre::{
    Result,
    ensure,
};
use std::{
    path::PathBuf,
    time::Duration,
};

pub const DEFAULT_SPIN_MS: u64 = 1500;
pub const DEFAULT_REVEAL_MS: u64 = 2000;
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "lucky-slip",
    version,
    about = "Pick an icon, place your chips and open the slip"
)]
pub struct Cli {
    /// Starting wallet balance
    #[arg(long, default_value_t = INITIAL_BALANCE)]
    pub initial_balance: u64,

    /// Duration of the spinning phase in milliseconds
    #[arg(long, default_value_t = DEFAULT_SPIN_MS)]
    pub spin_ms: u64,

    /// Duration of the reveal phase in milliseconds
    #[arg(long, default_value_t = DEFAULT_REVEAL_MS)]
    pub reveal_ms: u64,

    /// Seed for the draw; omit for an OS-seeded generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// API key for the prediction banner; without one a fixed line is shown
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for predictions
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the prediction API
    #[arg(long, default_value = DEFAULT_ADVISOR_URL)]
    pub advisor_url: String,

    /// Directory for the rolling log file
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub initial_balance: u64,
    pub spin_delay: Duration,
    pub reveal_delay: Duration,
    pub seed: Option<u64>,
    pub advisor: Advisor,
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        ensure!(cli.spin_ms > 0, "--spin-ms must be greater than zero");
        ensure!(cli.reveal_ms > 0, "--reveal-ms must be greater than zero");
        let advisor = match cli.api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => Advisor::Gemini(GeminiAdvisor::new(
                cli.advisor_url,
                cli.model,
                key,
            )?),
            None => Advisor::Static(StaticAdvisor),
        };
        Ok(Self {
            initial_balance: cli.initial_balance,
            spin_delay: Duration::from_millis(cli.spin_ms),
            reveal_delay: Duration::from_millis(cli.reveal_ms),
            seed: cli.seed,
            advisor,
            log_dir: resolve_log_dir(&cli.log_dir),
        })
    }
}

pub fn resolve_log_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
