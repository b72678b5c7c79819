use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to read price data: {0}")]
    Io(#[from] std::io::Error),

    #[error("The HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse price data: {0}")]
    Parse(String),

    #[error("No price data found for {0}")]
    NotFound(String),

    #[error("The price source returned an error: {0}")]
    Upstream(String),

    #[error("Price data does not form a valid series: {0}")]
    InvalidSeries(#[from] CoreError),
}
