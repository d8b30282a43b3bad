//! regimebot CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use trading_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = setup_logging(cli.log_level.as_str(), cli.json_logs, cli.log_file.as_deref());

    match cli.command {
        Commands::Paper(args) => cli::commands::paper::run(args, &cli.config).await,
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::ValidateConfig { verbose } => {
            cli::commands::validate::run(&cli.config, verbose).await
        }
    }
}
