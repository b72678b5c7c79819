use crate::error::MarketDataError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;

pub mod csv_source;
pub mod error;
pub mod yahoo;

// --- Public API ---
pub use csv_source::CsvSource;
pub use yahoo::YahooClient;

/// The generic, abstract interface for anything that can supply daily prices.
/// Commands only talk to this trait, allowing the underlying implementation
/// (local files, a web API or a test double) to be swapped out.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// A short name for log messages.
    fn name(&self) -> &str;

    /// Fetches the daily bars of `symbol` dated within `[start, end]`, oldest first.
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketDataError>;
}
