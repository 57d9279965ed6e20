pub mod cli;
pub mod config;
pub mod core;
pub mod fetcher;
pub mod providers;

pub use crate::core::{FetchError, TickerData, TickerTable};
pub use crate::fetcher::{BENCHMARK_TICKER, FetchRequest, TickerDataFetcher};

use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Fetch(cli::fetch::FetchArgs),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("tickerdata starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let fetcher = TickerDataFetcher::from_config(&config)?;

    match command {
        AppCommand::Fetch(args) => cli::fetch::run(&fetcher, &args).await,
    }
}
