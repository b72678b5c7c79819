//! # Stockscope Analytics Engine
//!
//! This crate turns raw daily price series into return, risk and
//! relative-performance metrics.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of where prices come from or
//!   how results are shown. It depends only on `core-types`.
//! - **Stateless Calculation:** Every operation is a pure function of its
//!   inputs. Undefined results are reported as an `AnalyticsError`, never
//!   replaced by a default value.
//!
//! ## Public API
//!
//! - `compute_daily_returns`, `annualize_return`, `annualize_volatility`,
//!   `sharpe_ratio`, `beta_and_fit`: the individual transforms.
//! - `align_returns`: builds paired instrument and benchmark returns for
//!   regression, by position or on the shared trading calendar.
//! - `AnalyticsEngine` / `run_full_analysis`: all of the above in one call.
//! - `comparison_chart`: side-by-side series for several instruments.

// Declare the modules that constitute this crate.
pub mod alignment;
pub mod compare;
pub mod engine;
pub mod error;
pub mod regression;
pub mod report;
pub mod returns;

// Re-export the key components to create a clean, public-facing API.
pub use alignment::{align_returns, AlignedReturns};
pub use compare::{comparison_chart, ComparisonChart, ComparisonRow};
pub use engine::{run_full_analysis, AnalyticsEngine};
pub use error::{AnalyticsError, ErrorKind};
pub use regression::{beta_and_fit, RegressionFit};
pub use report::{AnalysisParams, AnalysisResult};
pub use returns::{
    annualize_return, annualize_return_with, annualize_volatility, compute_daily_returns,
    sharpe_ratio, DEFAULT_RISK_FREE_RATE, DEFAULT_TRADING_DAYS,
};
