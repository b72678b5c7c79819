use chrono::NaiveDate;
use core_types::{PriceField, PriceSeries};
use serde::Serialize;
use std::collections::BTreeMap;

/// One date of a comparison chart; `values` lines up with `ComparisonChart::symbols`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// Several instruments' values for one field, indexed by the union of their dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChart {
    pub field: PriceField,
    pub symbols: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonChart {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The series of a single symbol, skipping dates it did not trade.
    pub fn column(&self, symbol: &str) -> Option<Vec<(NaiveDate, f64)>> {
        let idx = self.symbols.iter().position(|s| s == symbol)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.values[idx].map(|v| (row.date, v)))
                .collect(),
        )
    }
}

/// Lays the chosen field of each series side by side.
///
/// Dates missing from a series are left empty rather than filled.
pub fn comparison_chart(series: &[PriceSeries], field: PriceField) -> ComparisonChart {
    let width = series.len();
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

    for (idx, s) in series.iter().enumerate() {
        for (date, value) in s.field_values(field) {
            rows.entry(date).or_insert_with(|| vec![None; width])[idx] = Some(value);
        }
    }

    ComparisonChart {
        field,
        symbols: series.iter().map(|s| s.symbol().to_string()).collect(),
        rows: rows
            .into_iter()
            .map(|(date, values)| ComparisonRow { date, values })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PriceBar;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, d).unwrap()
    }

    fn series(symbol: &str, days: &[(u32, f64)]) -> PriceSeries {
        let bars = days
            .iter()
            .map(|&(d, close)| PriceBar {
                date: day(d),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: close * 100.0,
            })
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    #[test]
    fn merges_calendars_and_leaves_gaps_empty() {
        let googl = series("GOOGL", &[(1, 10.0), (2, 11.0), (5, 12.0)]);
        let gme = series("GME", &[(2, 20.0), (3, 21.0)]);

        let chart = comparison_chart(&[googl, gme], PriceField::Close);

        assert_eq!(chart.symbols, vec!["GOOGL", "GME"]);
        let dates: Vec<_> = chart.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3), day(5)]);
        assert_eq!(chart.rows[0].values, vec![Some(10.0), None]);
        assert_eq!(chart.rows[1].values, vec![Some(11.0), Some(20.0)]);
        assert_eq!(chart.rows[2].values, vec![None, Some(21.0)]);
    }

    #[test]
    fn selects_requested_field() {
        let msft = series("MSFT", &[(1, 10.0), (2, 11.0)]);
        let chart = comparison_chart(&[msft], PriceField::Volume);

        assert_eq!(chart.column("MSFT").unwrap(), vec![(day(1), 1000.0), (day(2), 1100.0)]);
        assert!(chart.column("AAPL").is_none());
    }

    #[test]
    fn empty_selection_gives_empty_chart() {
        let chart = comparison_chart(&[], PriceField::Open);
        assert!(chart.is_empty());
        assert!(chart.symbols.is_empty());
    }
}
