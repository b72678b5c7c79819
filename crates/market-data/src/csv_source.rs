use crate::error::MarketDataError;
use crate::PriceSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PriceBar, PriceSeries};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Reads `<data_dir>/<SYMBOL>.csv` files in the layout of a Yahoo Finance
/// history download (`Date,Open,High,Low,Close,Adj Close,Volume`).
///
/// Columns are located by header name, so their order and any extra columns
/// do not matter. Rows with `null` fields are skipped.
#[derive(Debug, Clone)]
pub struct CsvSource {
    data_dir: PathBuf,
}

impl CsvSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol.to_ascii_uppercase()))
    }
}

#[async_trait]
impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketDataError> {
        let path = self.path_for(symbol);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MarketDataError::NotFound(format!(
                    "{} (expected {})",
                    symbol,
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let series = parse_csv(symbol, &text, &path)?;
        tracing::debug!(symbol, rows = series.len(), path = %path.display(), "Loaded CSV prices.");
        Ok(series.slice_dates(start, end))
    }
}

/// One data row, read by the normalized (lowercase) header names.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(deserialize_with = "nullable_price")]
    open: Option<f64>,
    #[serde(deserialize_with = "nullable_price")]
    high: Option<f64>,
    #[serde(deserialize_with = "nullable_price")]
    low: Option<f64>,
    #[serde(deserialize_with = "nullable_price")]
    close: Option<f64>,
    #[serde(deserialize_with = "nullable_price")]
    volume: Option<f64>,
}

impl CsvRow {
    /// `Ok(None)` marks a row the source left blank (`null` or empty cells).
    fn into_bar(self) -> Result<Option<PriceBar>, String> {
        // Timestamped exports carry a time and offset after the date.
        let date_part = self.date.get(..10).unwrap_or(&self.date);
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{}': {}", self.date, e))?;

        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) =
            (self.open, self.high, self.low, self.close, self.volume)
        else {
            return Ok(None);
        };
        Ok(Some(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        }))
    }
}

fn nullable_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid number '{}': {}", raw, e)))
}

/// Parses a whole CSV document into a series, sorted by date.
pub fn parse_csv(symbol: &str, text: &str, origin: &Path) -> Result<PriceSeries, MarketDataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = normalized_headers(&mut reader, origin)?;

    let mut bars = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(origin, &e))?;
        let line = record.position().map_or(0, |p| p.line());
        let parsed = record
            .deserialize::<CsvRow>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(CsvRow::into_bar);

        match parsed {
            Ok(Some(bar)) => bars.push(bar),
            Ok(None) => {
                tracing::warn!(symbol, line, "Skipping row with missing values.");
            }
            Err(msg) => {
                return Err(MarketDataError::Parse(format!(
                    "{}:{}: {}",
                    origin.display(),
                    line,
                    msg
                )));
            }
        }
    }

    bars.sort_by_key(|b| b.date);
    Ok(PriceSeries::new(symbol.to_ascii_uppercase(), bars)?)
}

/// Lowercases the header row so `Date` and `date` both match, and checks that
/// every required column is present.
fn normalized_headers(
    reader: &mut csv::Reader<&[u8]>,
    origin: &Path,
) -> Result<csv::StringRecord, MarketDataError> {
    let headers: csv::StringRecord = reader
        .headers()
        .map_err(|e| csv_error(origin, &e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|wanted| !headers.iter().any(|h| h == **wanted))
    {
        return Err(MarketDataError::Parse(format!(
            "{} has no '{}' column",
            origin.display(),
            missing
        )));
    }
    Ok(headers)
}

fn csv_error(origin: &Path, err: &csv::Error) -> MarketDataError {
    match err.position() {
        Some(pos) => MarketDataError::Parse(format!("{}:{}: {}", origin.display(), pos.line(), err)),
        None => MarketDataError::Parse(format!("{}: {}", origin.display(), err)),
    }
}
