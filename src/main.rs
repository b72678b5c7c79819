use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::{DataSourceKind, LoggingSettings};
use core_types::{AlignmentMode, AnnualizationMode, PriceField};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod render;

/// The main entry point for the Stockscope application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = configuration::load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(&settings.logging)?;

    let source_kind = cli.source.unwrap_or(settings.market_data.source);
    let source = commands::build_source(source_kind, &settings.market_data)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Tickers => commands::handle_tickers(&settings),
        Commands::Single(args) => commands::handle_single(args, &settings, source).await,
        Commands::Compare(args) => commands::handle_compare(args, &settings, source).await,
        Commands::Analyze(args) => commands::handle_analyze(args, &settings, source).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Daily price history and risk/return statistics for a handful of equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Where to read prices from (overrides `market_data.source`).
    #[arg(long, global = true, value_enum)]
    source: Option<DataSourceKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available companies.
    Tickers,
    /// Show the price history of one stock.
    Single(SingleArgs),
    /// Put one field of several stocks side by side.
    Compare(CompareArgs),
    /// Compute annualized return, volatility, Sharpe ratio and beta.
    Analyze(AnalyzeArgs),
}

/// The date window shared by every data command.
#[derive(clap::Args, Clone, Copy)]
pub(crate) struct WindowArgs {
    /// First day to include (format: YYYY-MM-DD). Defaults to `market_data.start_date`.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (format: YYYY-MM-DD). Defaults to `market_data.end_date`.
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Parser)]
pub(crate) struct SingleArgs {
    /// The stock to show, by symbol or name (e.g., "GOOGL" or "Google").
    #[arg(long)]
    pub symbol: String,

    /// Which columns to show; repeat for several. Defaults to the closing price.
    #[arg(long = "field")]
    pub fields: Vec<PriceField>,

    /// Only show the most recent N days.
    #[arg(long)]
    pub tail: Option<usize>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Print chart-ready JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub(crate) struct CompareArgs {
    /// A stock to include, by name or symbol; repeat for several.
    #[arg(long = "stock")]
    pub stocks: Vec<String>,

    /// The column to compare.
    #[arg(long, default_value = "close")]
    pub field: PriceField,

    /// Only show the most recent N days.
    #[arg(long)]
    pub tail: Option<usize>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Print chart-ready JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub(crate) struct AnalyzeArgs {
    /// The stock to analyse; repeat for several.
    #[arg(long = "symbol", required = true)]
    pub symbols: Vec<String>,

    /// The benchmark for beta (overrides `analysis.benchmark`).
    #[arg(long)]
    pub benchmark: Option<String>,

    /// How returns are paired with the benchmark: positional or date-join.
    #[arg(long)]
    pub alignment: Option<AlignmentMode>,

    /// How daily returns are annualized: mean-daily or compounded.
    #[arg(long)]
    pub annualization: Option<AnnualizationMode>,

    /// Annual risk-free rate as a fraction (e.g., 0.02).
    #[arg(long)]
    pub risk_free_rate: Option<f64>,

    /// Trading days per year used for annualization.
    #[arg(long)]
    pub trading_days: Option<u32>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: human-readable output on stderr and, when a
/// directory is configured, a daily rolling log file.
///
/// The returned guard flushes the file writer when dropped, so it must live
/// until `main` returns.
fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("invalid log level")?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}
