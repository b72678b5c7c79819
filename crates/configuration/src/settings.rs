use chrono::NaiveDate;
use core_types::{default_universe, AlignmentMode, AnnualizationMode, Ticker};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an absent `config.toml` still yields a
/// usable configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub market_data: MarketDataSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// The instruments offered by the `tickers`, `single` and `compare` commands.
    #[serde(default = "default_universe")]
    pub universe: Vec<Ticker>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analysis: AnalysisSettings::default(),
            market_data: MarketDataSettings::default(),
            logging: LoggingSettings::default(),
            universe: default_universe(),
        }
    }
}

/// Parameters handed to the analytics engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub trading_days_per_year: u32,
    /// Annual risk-free rate as a fraction (e.g., 0.02 for 2%).
    pub risk_free_rate: f64,
    pub alignment: AlignmentMode,
    pub annualization: AnnualizationMode,
    /// The symbol that beta is measured against.
    pub benchmark: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            risk_free_rate: 0.02,
            alignment: AlignmentMode::Positional,
            annualization: AnnualizationMode::MeanDaily,
            benchmark: "SPY".to_string(),
        }
    }
}

/// Where daily prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// One `<SYMBOL>.csv` file per instrument in `data_dir`.
    #[default]
    Csv,
    /// The Yahoo Finance chart API.
    Yahoo,
}

/// Contains parameters for price retrieval.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataSettings {
    pub source: DataSourceKind,
    pub data_dir: PathBuf,
    /// The default start of the requested window (inclusive).
    pub start_date: NaiveDate,
    /// The default end of the requested window (inclusive).
    pub end_date: NaiveDate,
    pub request_timeout_secs: u64,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Csv,
            data_dir: PathBuf::from("data"),
            start_date: NaiveDate::from_ymd_opt(2010, 5, 31).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap_or_default(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory for the daily rolling log file. Logging to file is disabled when unset.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: Some(PathBuf::from("logs")),
            file_prefix: "stockscope.log".to_string(),
            level: "info".to_string(),
        }
    }
}
