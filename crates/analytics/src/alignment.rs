use crate::error::AnalyticsError;
use crate::returns::compute_daily_returns;
use core_types::{AlignmentMode, PriceSeries, ReturnSeries};
use std::collections::HashSet;

/// Paired instrument and benchmark observations, ready for regression.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    pub instrument: Vec<f64>,
    pub benchmark: Vec<f64>,
}

impl AlignedReturns {
    pub fn len(&self) -> usize {
        self.instrument.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrument.is_empty()
    }
}

/// Builds the instrument and benchmark returns paired for regression.
///
/// `Positional` computes each side's returns over its own bars and pairs them
/// by index; equal lengths are required and calendar differences go unnoticed.
/// `DateJoin` first keeps only the trading days present in both price series
/// and computes both return series on that shared calendar, so every pair
/// spans the same interval.
pub fn align_returns(
    instrument: &PriceSeries,
    benchmark: &PriceSeries,
    mode: AlignmentMode,
) -> Result<AlignedReturns, AnalyticsError> {
    match mode {
        AlignmentMode::Positional => pair_by_index(
            &compute_daily_returns(instrument)?,
            &compute_daily_returns(benchmark)?,
        ),
        AlignmentMode::DateJoin => {
            let (instrument_shared, benchmark_shared) = shared_calendar(instrument, benchmark)?;

            let dropped = (instrument.len() - instrument_shared.len())
                + (benchmark.len() - benchmark_shared.len());
            if dropped > 0 {
                tracing::debug!(
                    symbol = instrument.symbol(),
                    benchmark = benchmark.symbol(),
                    dropped,
                    shared = instrument_shared.len(),
                    "Dropped bars outside the shared trading calendar."
                );
            }

            pair_by_index(
                &compute_daily_returns(&instrument_shared)?,
                &compute_daily_returns(&benchmark_shared)?,
            )
        }
    }
}

fn pair_by_index(
    instrument: &ReturnSeries,
    benchmark: &ReturnSeries,
) -> Result<AlignedReturns, AnalyticsError> {
    if instrument.len() != benchmark.len() {
        return Err(AnalyticsError::LengthMismatch {
            left: instrument.len(),
            right: benchmark.len(),
        });
    }
    Ok(AlignedReturns {
        instrument: instrument.values(),
        benchmark: benchmark.values(),
    })
}

/// Restricts both series to the dates they have in common.
fn shared_calendar(
    instrument: &PriceSeries,
    benchmark: &PriceSeries,
) -> Result<(PriceSeries, PriceSeries), AnalyticsError> {
    let instrument_dates: HashSet<_> = instrument.bars().iter().map(|b| b.date).collect();
    let shared: HashSet<_> = benchmark
        .bars()
        .iter()
        .map(|b| b.date)
        .filter(|d| instrument_dates.contains(d))
        .collect();

    let keep = |series: &PriceSeries| {
        let bars = series
            .bars()
            .iter()
            .filter(|b| shared.contains(&b.date))
            .copied()
            .collect();
        PriceSeries::new(series.symbol(), bars)
    };
    Ok((keep(instrument)?, keep(benchmark)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;
    use core_types::PriceBar;

    fn prices(symbol: &str, rows: &[(u32, f64)]) -> PriceSeries {
        let bars = rows
            .iter()
            .map(|&(d, close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{} != {}", a, e);
        }
    }

    #[test]
    fn positional_pairs_by_index_even_when_dates_differ() {
        let a = prices("AAPL", &[(1, 100.0), (2, 101.0), (4, 103.02)]);
        let b = prices("SPY", &[(1, 10.0), (3, 11.0), (4, 12.1)]);

        let aligned = align_returns(&a, &b, AlignmentMode::Positional).unwrap();
        assert_close(&aligned.instrument, &[0.01, 0.02]);
        assert_close(&aligned.benchmark, &[0.1, 0.1]);
    }

    #[test]
    fn positional_rejects_unequal_lengths() {
        let a = prices("AAPL", &[(1, 100.0), (2, 101.0), (3, 102.0)]);
        let b = prices("SPY", &[(1, 10.0), (2, 11.0)]);

        let err = align_returns(&a, &b, AlignmentMode::Positional).unwrap_err();
        assert_eq!(err, AnalyticsError::LengthMismatch { left: 2, right: 1 });
    }

    #[test]
    fn date_join_computes_returns_on_the_shared_calendar() {
        // The instrument skipped the 4th; the benchmark rose 10% between the
        // 3rd and the 5th, all of it on the 4th.
        let a = prices("AAPL", &[(1, 100.0), (3, 100.0), (5, 110.0)]);
        let b = prices("SPY", &[(1, 100.0), (3, 100.0), (4, 110.0), (5, 110.0)]);

        let aligned = align_returns(&a, &b, AlignmentMode::DateJoin).unwrap();
        assert_close(&aligned.instrument, &[0.0, 0.1]);
        assert_close(&aligned.benchmark, &[0.0, 0.1]);
        assert_eq!(aligned.len(), 2);
    }

    #[test]
    fn date_join_without_two_shared_days_is_insufficient() {
        let a = prices("AAPL", &[(1, 100.0), (2, 101.0)]);
        let b = prices("SPY", &[(2, 10.0), (3, 11.0)]);

        let err = align_returns(&a, &b, AlignmentMode::DateJoin).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }
}
