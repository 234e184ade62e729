//! CLI definitions.

pub mod commands;

use barsim_core::Timeframe;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "barsim")]
#[command(author, version, about = "Deterministic bar-driven trading simulation")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BARSIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Directory for the run log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
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

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a simulation over historical bars
    Backtest(BacktestArgs),
    /// Run the MA/RSI strategy over a grid of window sizes
    Sweep(SweepArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

/// Where bars come from.
#[derive(clap::Args)]
pub struct DataArgs {
    /// Data file (CSV)
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol to simulate (defaults to backtest.symbol)
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Bar timeframe (inferred from the first two bars when omitted)
    #[arg(short, long)]
    pub timeframe: Option<Timeframe>,

    /// Start time, inclusive (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub start: Option<String>,

    /// End time, exclusive (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Strategy to run (defaults to strategy.name)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Strategy configuration file (TOML)
    #[arg(long)]
    pub strategy_config: Option<PathBuf>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Commission as a fraction of traded value
    #[arg(long)]
    pub commission_rate: Option<Decimal>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the full result as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Directory for the trade log and capital curve CSV files
    #[arg(long)]
    pub trades_csv: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Fast moving average windows (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "3,5,8")]
    pub fast: Vec<usize>,

    /// Slow moving average windows (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "10,15,20")]
    pub slow: Vec<usize>,

    /// RSI windows (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "6")]
    pub rsi: Vec<usize>,

    /// Number of best combinations to print
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}
