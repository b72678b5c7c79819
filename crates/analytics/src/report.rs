use crate::regression::RegressionFit;
use crate::returns::{DEFAULT_RISK_FREE_RATE, DEFAULT_TRADING_DAYS};
use core_types::{AlignmentMode, AnnualizationMode, ReturnSeries};
use serde::{Deserialize, Serialize};

/// The explicit knobs of a full analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub trading_days_per_year: u32,
    /// Annual risk-free rate as a fraction (0.02 = 2%).
    pub risk_free_rate: f64,
    pub alignment: AlignmentMode,
    pub annualization: AnnualizationMode,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            trading_days_per_year: DEFAULT_TRADING_DAYS,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            alignment: AlignmentMode::default(),
            annualization: AnnualizationMode::default(),
        }
    }
}

/// The risk/return profile of one instrument against a benchmark.
///
/// This struct is the final output of the `AnalyticsEngine`. All ratios are
/// fractions; formatting them as percentages is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub benchmark: String,

    pub annualized_return: f64,
    pub annualized_volatility: f64, // always >= 0
    pub sharpe_ratio: f64,
    pub beta: f64,

    /// The complete regression behind `beta`.
    pub fit: RegressionFit,

    pub daily_returns: ReturnSeries,

    pub params: AnalysisParams,
}
