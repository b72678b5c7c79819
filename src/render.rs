use analytics::{AnalysisResult, AnalyticsError, ComparisonChart, ErrorKind};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use core_types::{PriceField, PriceSeries, Ticker};
use market_data::error::MarketDataError;
use serde_json::{json, Value};
use std::fmt;

/// Why one instrument of an `analyze` run has no result.
#[derive(Debug)]
pub enum AnalysisFailure {
    Fetch(MarketDataError),
    Analytics(AnalyticsError),
}

impl fmt::Display for AnalysisFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisFailure::Fetch(e) => write!(f, "{}", e),
            AnalysisFailure::Analytics(e) => write!(f, "{}", e),
        }
    }
}

impl AnalysisFailure {
    /// The message shown to the user in place of the metrics.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisFailure::Fetch(MarketDataError::NotFound(_)) => {
                "no price data available for this stock".to_string()
            }
            AnalysisFailure::Fetch(e) => format!("could not load prices: {}", e),
            AnalysisFailure::Analytics(e) => match e.kind() {
                ErrorKind::InsufficientData => {
                    "not enough history to compute this metric".to_string()
                }
                ErrorKind::DegenerateInput => {
                    "the benchmark did not move in this window, so beta is undefined".to_string()
                }
                ErrorKind::DivisionByZero => {
                    "the price did not move in this window, so the Sharpe ratio is undefined"
                        .to_string()
                }
                ErrorKind::LengthMismatch => {
                    "stock and benchmark trading calendars differ; try --alignment date-join"
                        .to_string()
                }
                ErrorKind::InvalidSeries => format!("price data is invalid: {}", e),
            },
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            AnalysisFailure::Fetch(_) => "fetch",
            AnalysisFailure::Analytics(e) => match e.kind() {
                ErrorKind::InsufficientData => "insufficient_data",
                ErrorKind::DegenerateInput => "degenerate_input",
                ErrorKind::DivisionByZero => "division_by_zero",
                ErrorKind::LengthMismatch => "length_mismatch",
                ErrorKind::InvalidSeries => "invalid_series",
            },
        }
    }
}

pub type AnalysisOutcome = (String, Result<AnalysisResult, AnalysisFailure>);

pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn format_field(field: PriceField, value: f64) -> String {
    match field {
        PriceField::Volume => format!("{:.0}", value),
        _ => format!("{:.2}", value),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_numbers_right(table: &mut Table, from_column: usize) {
    for column in table.column_iter_mut().skip(from_column) {
        column.set_cell_alignment(CellAlignment::Right);
    }
}

pub fn tickers_table(universe: &[Ticker]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Symbol", "Name", "Company", "Sector"]);
    for ticker in universe {
        table.add_row(vec![
            ticker.symbol.as_str(),
            ticker.display_name.as_str(),
            ticker.company.as_str(),
            ticker.sector.as_str(),
        ]);
    }
    table
}

pub fn single_table(series: &PriceSeries, fields: &[PriceField]) -> Table {
    let mut table = new_table();
    let mut header = vec!["Date".to_string()];
    header.extend(fields.iter().map(|f| f.label().to_string()));
    table.set_header(header);

    for bar in series.bars() {
        let mut row = vec![bar.date.to_string()];
        row.extend(fields.iter().map(|&f| format_field(f, bar.value(f))));
        table.add_row(row);
    }
    align_numbers_right(&mut table, 1);
    table
}

pub fn single_json(series: &PriceSeries, fields: &[PriceField]) -> serde_json::Result<String> {
    let mut by_field = serde_json::Map::new();
    for &field in fields {
        let points: Vec<Value> = series
            .field_values(field)
            .into_iter()
            .map(|(date, value)| json!({ "date": date, "value": value }))
            .collect();
        by_field.insert(field.to_string(), Value::Array(points));
    }
    serde_json::to_string_pretty(&json!({
        "symbol": series.symbol(),
        "series": by_field,
    }))
}

/// Renders a comparison chart with one column per stock, headed by display name.
pub fn comparison_table(chart: &ComparisonChart, names: &[&str]) -> Table {
    let mut table = new_table();
    let mut header = vec!["Date".to_string()];
    header.extend(
        chart
            .symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| names.get(i).map_or_else(|| symbol.clone(), |n| n.to_string())),
    );
    table.set_header(header);

    for row in &chart.rows {
        let mut cells = vec![row.date.to_string()];
        cells.extend(
            row.values
                .iter()
                .map(|v| v.map_or_else(String::new, |v| format_field(chart.field, v))),
        );
        table.add_row(cells);
    }
    align_numbers_right(&mut table, 1);
    table
}

pub fn analysis_table(outcomes: &[AnalysisOutcome]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Symbol",
        "Ann. Return",
        "Ann. Volatility",
        "Sharpe",
        "Beta",
        "Alpha",
        "R²",
        "p-value",
        "Obs",
    ]);

    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                table.add_row(vec![
                    symbol.clone(),
                    format_pct(result.annualized_return),
                    format_pct(result.annualized_volatility),
                    format!("{:.3}", result.sharpe_ratio),
                    format!("{:.3}", result.beta),
                    format!("{:.6}", result.fit.alpha),
                    format!("{:.3}", result.fit.r_squared()),
                    format!("{:.4}", result.fit.p_value),
                    result.fit.observations.to_string(),
                ]);
            }
            Err(failure) => {
                table.add_row(vec![symbol.clone(), failure.user_message()]);
            }
        }
    }
    align_numbers_right(&mut table, 1);
    table
}

pub fn analysis_json(outcomes: &[AnalysisOutcome]) -> serde_json::Result<String> {
    let entries = outcomes
        .iter()
        .map(|(symbol, outcome)| match outcome {
            Ok(result) => serde_json::to_value(result),
            Err(failure) => Ok(json!({
                "symbol": symbol,
                "error": failure.kind_name(),
                "message": failure.user_message(),
            })),
        })
        .collect::<serde_json::Result<Vec<Value>>>()?;
    serde_json::to_string_pretty(&entries)
}
