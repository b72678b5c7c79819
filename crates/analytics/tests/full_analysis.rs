use analytics::{
    annualize_return, annualize_volatility, compute_daily_returns, run_full_analysis,
    AnalysisParams, AnalyticsEngine, ErrorKind,
};
use chrono::{Datelike, NaiveDate, Weekday};
use core_types::{AlignmentMode, AnnualizationMode, PriceBar, PriceSeries};

const TOL: f64 = 1e-9;

/// Builds a series on consecutive weekdays starting Monday 2024-01-01.
fn weekday_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut bars = Vec::with_capacity(closes.len());
    for &close in closes {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.succ_opt().unwrap();
        }
        bars.push(PriceBar {
            date,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0,
        });
        date = date.succ_opt().unwrap();
    }
    PriceSeries::new(symbol, bars).unwrap()
}

fn series_on(symbol: &str, rows: &[(NaiveDate, f64)]) -> PriceSeries {
    let bars = rows
        .iter()
        .map(|&(date, close)| PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        })
        .collect();
    PriceSeries::new(symbol, bars).unwrap()
}

#[test]
fn full_analysis_agrees_with_individual_operations() {
    let prices = weekday_series("GOOGL", &[100.0, 102.0, 101.0, 105.0, 104.0, 108.0]);
    let benchmark = weekday_series("SPY", &[400.0, 402.0, 401.5, 406.0, 404.0, 409.0]);
    let params = AnalysisParams::default();

    let result = run_full_analysis(&prices, &benchmark, &params).unwrap();

    let returns = compute_daily_returns(&prices).unwrap();
    let expected_return = annualize_return(&returns, 252).unwrap();
    let expected_vol = annualize_volatility(&returns, 252).unwrap();

    assert_eq!(result.symbol, "GOOGL");
    assert_eq!(result.benchmark, "SPY");
    assert_eq!(result.daily_returns.len(), prices.len() - 1);
    assert!((result.annualized_return - expected_return).abs() < TOL);
    assert!((result.annualized_volatility - expected_vol).abs() < TOL);
    assert!(
        (result.sharpe_ratio - (expected_return - 0.02) / expected_vol).abs() < TOL
    );
    assert_eq!(result.beta, result.fit.beta);
    assert_eq!(result.fit.observations, 5);
    assert!(result.beta > 0.0);
}

#[test]
fn engine_wraps_its_parameters() {
    let prices = weekday_series("AAPL", &[10.0, 10.5, 10.2, 10.9, 11.1]);
    let benchmark = weekday_series("SPY", &[100.0, 101.0, 100.5, 102.0, 102.5]);
    let params = AnalysisParams {
        annualization: AnnualizationMode::Compounded,
        risk_free_rate: 0.0,
        ..AnalysisParams::default()
    };

    let engine = AnalyticsEngine::new(params);
    let result = engine.analyze(&prices, &benchmark).unwrap();

    // Compounding the realized path: 11.1 / 10.0 over 4 days.
    let expected = (11.1_f64 / 10.0).powf(252.0 / 4.0) - 1.0;
    assert!((result.annualized_return - expected).abs() / expected < 1e-9);
    assert!((result.sharpe_ratio - result.annualized_return / result.annualized_volatility).abs() < TOL);
    assert_eq!(result.params, params);
}

#[test]
fn analysing_against_itself_gives_unit_beta() {
    let prices = weekday_series("MSFT", &[300.0, 303.0, 299.0, 310.0, 305.0]);
    let result = run_full_analysis(&prices, &prices, &AnalysisParams::default()).unwrap();

    assert!((result.beta - 1.0).abs() < 1e-9);
    assert!(result.fit.alpha.abs() < 1e-9);
    assert!((result.fit.r_value - 1.0).abs() < 1e-9);
}

#[test]
fn short_history_fails_fast() {
    let prices = weekday_series("GME", &[20.0]);
    let benchmark = weekday_series("SPY", &[400.0, 401.0, 402.0]);

    let err = run_full_analysis(&prices, &benchmark, &AnalysisParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

#[test]
fn flat_instrument_reports_division_by_zero() {
    let prices = weekday_series("GME", &[20.0, 20.0, 20.0, 20.0]);
    let benchmark = weekday_series("SPY", &[400.0, 401.0, 399.0, 402.0]);

    let err = run_full_analysis(&prices, &benchmark, &AnalysisParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DivisionByZero);
}

#[test]
fn flat_benchmark_is_degenerate() {
    let prices = weekday_series("AAPL", &[10.0, 10.5, 10.2, 10.9]);
    let benchmark = weekday_series("SPY", &[400.0, 400.0, 400.0, 400.0]);

    let err = run_full_analysis(&prices, &benchmark, &AnalysisParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DegenerateInput);
}

#[test]
fn calendar_gap_needs_date_join() {
    let d = |day| NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
    // The instrument did not trade on the 4th.
    let prices = series_on("AAPL", &[(d(1), 10.0), (d(2), 10.4), (d(3), 10.1), (d(5), 10.6), (d(8), 10.9)]);
    let benchmark = series_on(
        "SPY",
        &[(d(1), 100.0), (d(2), 101.0), (d(3), 100.2), (d(4), 100.9), (d(5), 101.8), (d(8), 102.0)],
    );

    let positional = run_full_analysis(&prices, &benchmark, &AnalysisParams::default()).unwrap_err();
    assert_eq!(positional.kind(), ErrorKind::LengthMismatch);

    let params = AnalysisParams {
        alignment: AlignmentMode::DateJoin,
        ..AnalysisParams::default()
    };
    let joined = run_full_analysis(&prices, &benchmark, &params).unwrap();
    // The shared calendar is 1, 2, 3, 5, 8; the benchmark's 4th is dropped.
    assert_eq!(joined.fit.observations, 4);
    // Annualized metrics still use the instrument's own history.
    assert_eq!(joined.daily_returns.len(), 4);
}

#[test]
fn date_join_pairs_moves_across_a_gap() {
    let d = |day| NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
    // Both legs gain 10% from the 3rd to the 5th; only the benchmark traded on the 4th.
    let prices = series_on("AAPL", &[(d(1), 100.0), (d(2), 101.0), (d(3), 100.0), (d(5), 110.0)]);
    let benchmark = series_on(
        "SPY",
        &[(d(1), 200.0), (d(2), 202.0), (d(3), 200.0), (d(4), 220.0), (d(5), 220.0)],
    );
    let params = AnalysisParams {
        alignment: AlignmentMode::DateJoin,
        ..AnalysisParams::default()
    };

    let result = run_full_analysis(&prices, &benchmark, &params).unwrap();
    assert_eq!(result.fit.observations, 3);
    assert!((result.beta - 1.0).abs() < 1e-9);
    assert!((result.fit.r_value - 1.0).abs() < 1e-9);
    assert!(result.fit.alpha.abs() < 1e-9);
}

#[test]
fn short_benchmark_fails_before_instrument_metrics() {
    // A flat instrument would fail the Sharpe ratio, but the benchmark is checked first.
    let prices = weekday_series("GME", &[20.0, 20.0, 20.0]);
    let benchmark = weekday_series("SPY", &[400.0]);

    let err = run_full_analysis(&prices, &benchmark, &AnalysisParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

#[test]
fn analyses_run_independently_across_threads() {
    let benchmark = weekday_series("SPY", &[400.0, 402.0, 401.0, 405.0, 407.0]);
    let universe = vec![
        weekday_series("GOOGL", &[100.0, 101.0, 99.0, 103.0, 104.0]),
        weekday_series("AAPL", &[180.0, 183.0, 182.0, 186.0, 185.0]),
        weekday_series("MSFT", &[300.0, 301.0, 305.0, 304.0, 310.0]),
    ];
    let engine = AnalyticsEngine::default();
    let shared_benchmark = &benchmark;

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = universe
            .iter()
            .map(|prices| scope.spawn(move || engine.analyze(prices, shared_benchmark)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (prices, result) in universe.iter().zip(results) {
        let sequential = engine.analyze(prices, &benchmark).unwrap();
        assert_eq!(result.unwrap(), sequential);
    }
}

#[test]
fn result_serializes_for_display() {
    let prices = weekday_series("GOOGL", &[100.0, 102.0, 101.0, 105.0]);
    let benchmark = weekday_series("SPY", &[400.0, 403.0, 401.0, 404.0]);
    let result = run_full_analysis(&prices, &benchmark, &AnalysisParams::default()).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["symbol"], "GOOGL");
    assert_eq!(json["params"]["alignment"], "positional");
    assert_eq!(json["daily_returns"]["points"].as_array().unwrap().len(), 3);
}
