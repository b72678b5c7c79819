use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisSettings, DataSourceKind, LoggingSettings, MarketDataSettings, Settings,
};

/// Prefix of environment variables that override file values,
/// e.g. `STOCKSCOPE__ANALYSIS__RISK_FREE_RATE=0.03`.
pub const ENV_PREFIX: &str = "STOCKSCOPE";

/// Loads the application configuration from a TOML file and the environment.
///
/// The file is optional; missing keys fall back to their defaults. Values from
/// `STOCKSCOPE__*` variables take precedence over the file. The result is
/// validated before it is returned.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;

    tracing::debug!(path = %path.display(), "Loaded configuration.");
    Ok(settings)
}

/// Parses and validates configuration from TOML text, without consulting the environment.
pub fn parse_config(toml: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Settings>()?;
    validate(&settings)?;
    Ok(settings)
}

/// Rejects settings the rest of the application cannot work with.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let analysis = &settings.analysis;
    if analysis.trading_days_per_year == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.trading_days_per_year must be positive".to_string(),
        ));
    }
    if !analysis.risk_free_rate.is_finite() {
        return Err(ConfigError::ValidationError(
            "analysis.risk_free_rate must be a finite number".to_string(),
        ));
    }
    if analysis.benchmark.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "analysis.benchmark must name a symbol".to_string(),
        ));
    }

    let market_data = &settings.market_data;
    if market_data.start_date > market_data.end_date {
        return Err(ConfigError::ValidationError(format!(
            "market_data.start_date ({}) is after market_data.end_date ({})",
            market_data.start_date, market_data.end_date
        )));
    }
    if market_data.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "market_data.request_timeout_secs must be positive".to_string(),
        ));
    }

    if settings.universe.is_empty() {
        return Err(ConfigError::ValidationError(
            "universe must list at least one ticker".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for ticker in &settings.universe {
        if ticker.symbol.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "universe entries need a symbol".to_string(),
            ));
        }
        if !seen.insert(ticker.symbol.to_ascii_uppercase()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate universe symbol '{}'",
                ticker.symbol
            )));
        }
    }

    Ok(())
}
