use crate::alignment::align_returns;
use crate::error::AnalyticsError;
use crate::regression::beta_and_fit;
use crate::report::{AnalysisParams, AnalysisResult};
use crate::returns::{
    annualize_return_with, annualize_volatility, compute_daily_returns, sharpe_ratio,
};
use core_types::PriceSeries;

/// A stateless calculator for deriving risk/return metrics from daily prices.
///
/// The engine only holds its parameters; every call is a pure function of its
/// inputs, so one engine can be shared freely between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {
    params: AnalysisParams,
}

impl AnalyticsEngine {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// The main entry point for analysing one instrument.
    ///
    /// # Arguments
    ///
    /// * `prices` - The instrument's daily price history.
    /// * `benchmark_prices` - The benchmark's history over the same window.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalysisResult`, or the first `AnalyticsError`
    /// encountered. No partial results are produced.
    pub fn analyze(
        &self,
        prices: &PriceSeries,
        benchmark_prices: &PriceSeries,
    ) -> Result<AnalysisResult, AnalyticsError> {
        run_full_analysis(prices, benchmark_prices, &self.params)
    }
}

/// Computes returns, annualized return and volatility, Sharpe and beta in one pass.
pub fn run_full_analysis(
    prices: &PriceSeries,
    benchmark_prices: &PriceSeries,
    params: &AnalysisParams,
) -> Result<AnalysisResult, AnalyticsError> {
    let daily_returns = compute_daily_returns(prices)?;
    // The benchmark's returns are built during alignment; a history too short
    // for any return still fails before the instrument metrics.
    if benchmark_prices.len() < 2 {
        return Err(AnalyticsError::insufficient(
            "daily returns",
            2,
            benchmark_prices.len(),
        ));
    }

    let annualized_return = annualize_return_with(
        &daily_returns,
        params.trading_days_per_year,
        params.annualization,
    )?;
    let annualized_volatility = annualize_volatility(&daily_returns, params.trading_days_per_year)?;
    let sharpe = sharpe_ratio(annualized_return, annualized_volatility, params.risk_free_rate)?;

    let aligned = align_returns(prices, benchmark_prices, params.alignment)?;
    let fit = beta_and_fit(&aligned.instrument, &aligned.benchmark)?;

    tracing::debug!(
        symbol = prices.symbol(),
        benchmark = benchmark_prices.symbol(),
        annualized_return,
        annualized_volatility,
        sharpe,
        beta = fit.beta,
        "Completed analysis."
    );

    Ok(AnalysisResult {
        symbol: prices.symbol().to_string(),
        benchmark: benchmark_prices.symbol().to_string(),
        annualized_return,
        annualized_volatility,
        sharpe_ratio: sharpe,
        beta: fit.beta,
        fit,
        daily_returns,
        params: *params,
    })
}
