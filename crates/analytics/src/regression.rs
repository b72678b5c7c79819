use crate::error::AnalyticsError;
use crate::returns::{is_constant, mean};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Guards the t statistic against a zero denominator when |r| == 1.
const TINY: f64 = 1.0e-20;

/// Ordinary least-squares fit of instrument returns on benchmark returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    /// Slope: sensitivity of the instrument to the benchmark.
    pub beta: f64,
    /// Intercept.
    pub alpha: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    /// Two-sided p-value for the null hypothesis that the slope is zero.
    pub p_value: f64,
    /// Standard error of the slope.
    pub std_err: f64,
    /// Standard error of the intercept.
    pub intercept_stderr: f64,
    pub observations: usize,
}

impl RegressionFit {
    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }
}

/// Regresses `instrument` (dependent) on `benchmark` (independent).
///
/// The slices must already be paired observation by observation; see
/// [`crate::alignment::align_returns`]. A constant benchmark makes the slope
/// undefined and is rejected as degenerate.
pub fn beta_and_fit(instrument: &[f64], benchmark: &[f64]) -> Result<RegressionFit, AnalyticsError> {
    if instrument.len() != benchmark.len() {
        return Err(AnalyticsError::LengthMismatch {
            left: instrument.len(),
            right: benchmark.len(),
        });
    }
    let n = instrument.len();
    if n < 2 {
        return Err(AnalyticsError::insufficient("beta", 2, n));
    }
    if is_constant(benchmark) {
        return Err(AnalyticsError::DegenerateInput(
            "benchmark returns have zero variance".to_string(),
        ));
    }

    let (x, y) = (benchmark, instrument);
    let x_mean = mean(x);
    let y_mean = mean(y);
    let count = n as f64;

    // Population moments; the 1/n factors cancel in every ratio below.
    let ssxm = x.iter().map(|v| (v - x_mean).powi(2)).sum::<f64>() / count;
    let ssym = y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / count;
    let ssxym = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>()
        / count;

    let r_value = if is_constant(y) || ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let beta = ssxym / ssxm;
    let alpha = y_mean - beta * x_mean;

    let (p_value, std_err, intercept_stderr) = if n == 2 {
        // A line through two points fits exactly.
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (p, 0.0, 0.0)
    } else {
        let df = (n - 2) as f64;
        let t = r_value * (df / ((1.0 - r_value) * (1.0 + r_value) + TINY)).sqrt();
        let p = two_sided_p_value(t, df)?;
        let slope_se = ((1.0 - r_value * r_value) * ssym / ssxm / df).sqrt();
        let intercept_se = slope_se * (ssxm + x_mean * x_mean).sqrt();
        (p, slope_se, intercept_se)
    };

    tracing::debug!(beta, alpha, r_value, p_value, observations = n, "Fitted regression.");

    Ok(RegressionFit {
        beta,
        alpha,
        r_value,
        p_value,
        std_err,
        intercept_stderr,
        observations: n,
    })
}

fn two_sided_p_value(t: f64, df: f64) -> Result<f64, AnalyticsError> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AnalyticsError::DegenerateInput(format!("t distribution: {e}")))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}
