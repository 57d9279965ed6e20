use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tickerdata::cli::fetch::FetchArgs;
use tickerdata::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch price history or quotes for tickers
    Fetch {
        /// Ticker symbols, defaults to ^GSPC
        tickers: Vec<String>,

        /// Read ^GSPC from the local historical snapshot
        #[arg(long)]
        wsj: bool,

        /// Fetch the current quote instead of history
        #[arg(long)]
        quote: bool,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => tickerdata::cli::setup::setup(),
        Some(Commands::Fetch {
            tickers,
            wsj,
            quote,
            start,
            end,
        }) => {
            let args = FetchArgs {
                tickers,
                wsj,
                quote,
                start,
                end,
            };
            tickerdata::run_command(
                tickerdata::AppCommand::Fetch(args),
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
