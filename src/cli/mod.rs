//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "regimebot")]
#[command(author, version, about = "Regime-switching crypto trading bot")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "REGIMEBOT_CONFIG")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write JSON logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline against the paper ledger
    Paper(PaperArgs),
    /// List available strategies and overlays
    Strategies,
    /// Validate configuration
    ValidateConfig {
        /// Print the effective configuration after env overrides
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(clap::Args)]
pub struct PaperArgs {
    /// Base strategy: "adaptive" or a catalog name (overrides config)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Overlay, innermost first; repeatable: crash:<drop>, high_risk, low_risk
    #[arg(short, long = "overlay")]
    pub overlays: Vec<String>,

    /// Symbol to trade (overrides config)
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Candle interval (overrides config)
    #[arg(short, long)]
    pub timeframe: Option<String>,

    /// Replay candles from a CSV file instead of polling the exchange
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Starting quote balance (overrides config)
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Seconds between ticks (overrides config; CSV replay defaults to no delay)
    #[arg(long)]
    pub poll_secs: Option<u64>,

    /// Disable the CSV audit trail
    #[arg(long)]
    pub no_audit: bool,
}
