use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to calculate {metric}: need at least {required} observations, got {actual}")]
    InsufficientData {
        metric: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Calculation is undefined for degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Paired series differ in length: {left} vs {right} observations")]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid series: {0}")]
    InvalidSeries(#[from] CoreError),
}

/// The category of an [`AnalyticsError`], for callers that map failures to
/// their own messages without inspecting the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InsufficientData,
    DegenerateInput,
    DivisionByZero,
    LengthMismatch,
    InvalidSeries,
}

impl AnalyticsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyticsError::InsufficientData { .. } => ErrorKind::InsufficientData,
            AnalyticsError::DegenerateInput(_) => ErrorKind::DegenerateInput,
            AnalyticsError::DivisionByZero(_) => ErrorKind::DivisionByZero,
            AnalyticsError::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            AnalyticsError::InvalidSeries(_) => ErrorKind::InvalidSeries,
        }
    }

    pub(crate) fn insufficient(metric: &'static str, required: usize, actual: usize) -> Self {
        AnalyticsError::InsufficientData {
            metric,
            required,
            actual,
        }
    }
}
