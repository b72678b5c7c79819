use crate::error::AnalyticsError;
use core_types::{AnnualizationMode, PriceSeries, ReturnPoint, ReturnSeries};

/// Trading sessions in a typical US equity year.
pub const DEFAULT_TRADING_DAYS: u32 = 252;

/// Default annual risk-free rate used by the Sharpe ratio (2%).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Computes simple close-to-close returns: `close[i] / close[i-1] - 1`.
///
/// The first bar has no prior day and produces no return, so the result is
/// one entry shorter than `prices`. Each return is dated with the later bar.
pub fn compute_daily_returns(prices: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    if prices.len() < 2 {
        return Err(AnalyticsError::insufficient("daily returns", 2, prices.len()));
    }

    let points = prices
        .bars()
        .windows(2)
        .map(|w| ReturnPoint {
            date: w[1].date,
            value: w[1].close / w[0].close - 1.0,
        })
        .collect();

    Ok(ReturnSeries::new(prices.symbol(), points)?)
}

/// Annualizes daily returns from their arithmetic mean: `(1 + mean)^days - 1`.
pub fn annualize_return(
    daily_returns: &ReturnSeries,
    trading_days_per_year: u32,
) -> Result<f64, AnalyticsError> {
    annualize_return_with(daily_returns, trading_days_per_year, AnnualizationMode::MeanDaily)
}

/// Annualizes daily returns with the chosen method.
///
/// `Compounded` grows the realized path, `prod(1 + r)^(days / n) - 1`, and
/// therefore penalizes volatility drag that the mean-based figure smooths over.
pub fn annualize_return_with(
    daily_returns: &ReturnSeries,
    trading_days_per_year: u32,
    mode: AnnualizationMode,
) -> Result<f64, AnalyticsError> {
    let values = daily_returns.values();
    if values.is_empty() {
        return Err(AnalyticsError::insufficient("annualized return", 1, 0));
    }
    let days = f64::from(trading_days_per_year);

    let annualized = match mode {
        AnnualizationMode::MeanDaily => (1.0 + mean(&values)).powf(days) - 1.0,
        AnnualizationMode::Compounded => {
            let growth: f64 = values.iter().map(|r| 1.0 + r).product();
            growth.powf(days / values.len() as f64) - 1.0
        }
    };

    Ok(annualized)
}

/// Annualized volatility: sample standard deviation scaled by `sqrt(days)`.
pub fn annualize_volatility(
    daily_returns: &ReturnSeries,
    trading_days_per_year: u32,
) -> Result<f64, AnalyticsError> {
    let values = daily_returns.values();
    if values.len() < 2 {
        return Err(AnalyticsError::insufficient("annualized volatility", 2, values.len()));
    }
    Ok(sample_std_dev(&values) * f64::from(trading_days_per_year).sqrt())
}

/// Excess return per unit of volatility.
///
/// Zero volatility is reported as `DivisionByZero` instead of an infinite or
/// NaN ratio.
pub fn sharpe_ratio(
    annualized_return: f64,
    annualized_volatility: f64,
    risk_free_rate: f64,
) -> Result<f64, AnalyticsError> {
    if annualized_volatility == 0.0 {
        return Err(AnalyticsError::DivisionByZero("sharpe_ratio".to_string()));
    }
    Ok((annualized_return - risk_free_rate) / annualized_volatility)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n - 1) standard deviation. Identical values yield exactly zero.
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    if is_constant(values) {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

pub(crate) fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}
