use crate::error::MarketDataError;
use crate::PriceSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use core_types::{PriceBar, PriceSeries};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// A concrete implementation of `PriceSource` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(timeout: Duration) -> Result<Self, MarketDataError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        let mut headers = HeaderMap::new();
        // The chart endpoint rejects requests without a browser-like agent.
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (stockscope)"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = day_start_timestamp(start);
        // period2 is exclusive; extend it past the last requested day.
        let period2 = end
            .succ_opt()
            .map(day_start_timestamp)
            .unwrap_or_else(|| day_start_timestamp(end));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            // Error bodies are chart documents too; surface their description when present.
            let detail = parse_chart_error(&body).unwrap_or_else(|| status.to_string());
            return Err(MarketDataError::Upstream(detail));
        }

        let series = parse_chart(symbol, &body)?;
        tracing::debug!(symbol, rows = series.len(), "Fetched Yahoo prices.");
        Ok(series.slice_dates(start, end))
    }
}

fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Parses a `/v8/finance/chart` response body into a series.
///
/// Days with any missing OHLC value are skipped; a missing volume counts as
/// zero. When a date appears twice the later entry wins.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, MarketDataError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| MarketDataError::Parse(format!("failed to parse yahoo chart: {}", e)))?;

    if let Some(error) = response.chart.error {
        return Err(MarketDataError::Upstream(error.describe()));
    }

    let result = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| MarketDataError::Parse("no quote data in chart".to_string()))?;

    let mut by_date = BTreeMap::new();
    let mut skipped = 0usize;
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| MarketDataError::Parse(format!("invalid timestamp: {}", ts)))?
            .date_naive();

        let ohlc = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        );
        if let (Some(open), Some(high), Some(low), Some(close)) = ohlc {
            let volume = value_at(&quote.volume, i).unwrap_or(0.0);
            by_date.insert(
                date,
                PriceBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                },
            );
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        tracing::warn!(symbol, skipped, "Skipped chart entries with missing prices.");
    }

    let symbol = result.meta.map(|m| m.symbol).unwrap_or_else(|| symbol.to_ascii_uppercase());
    Ok(PriceSeries::new(symbol, by_date.into_values().collect())?)
}

fn parse_chart_error(body: &str) -> Option<String> {
    let response: ChartResponse = serde_json::from_str(body).ok()?;
    response.chart.error.map(|e| e.describe())
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

impl ChartError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(desc)) => format!("{}: {}", code, desc),
            (Some(code), None) => code.clone(),
            (None, Some(desc)) => desc.clone(),
            (None, None) => "unknown chart error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}
