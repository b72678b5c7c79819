use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the raw columns carried by every daily bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volume,
    ];

    /// The heading used when this field is shown as a chart or table column.
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Open => "Opening Price",
            PriceField::High => "High Price",
            PriceField::Low => "Low Price",
            PriceField::Close => "Closing Price",
            PriceField::Volume => "Volume",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        };
        f.write_str(name)
    }
}

impl FromStr for PriceField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            "volume" => Ok(PriceField::Volume),
            _ => Err(CoreError::UnknownVariant {
                field: "price field",
                value: s.to_string(),
            }),
        }
    }
}

/// How an instrument's returns are paired with the benchmark's before regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentMode {
    /// Pair observations by index. Both series must have the same length.
    #[default]
    Positional,
    /// Keep only the dates present in both series.
    DateJoin,
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::Positional => f.write_str("positional"),
            AlignmentMode::DateJoin => f.write_str("date-join"),
        }
    }
}

impl FromStr for AlignmentMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" => Ok(AlignmentMode::Positional),
            "date-join" | "date_join" | "datejoin" => Ok(AlignmentMode::DateJoin),
            _ => Err(CoreError::UnknownVariant {
                field: "alignment mode",
                value: s.to_string(),
            }),
        }
    }
}

/// How a series of daily returns is scaled to a yearly figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnualizationMode {
    /// `(1 + mean(r))^days - 1`, compounding a representative average day.
    #[default]
    MeanDaily,
    /// `prod(1 + r)^(days / n) - 1`, compounding the realized path.
    Compounded,
}

impl fmt::Display for AnnualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnualizationMode::MeanDaily => f.write_str("mean-daily"),
            AnnualizationMode::Compounded => f.write_str("compounded"),
        }
    }
}

impl FromStr for AnnualizationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean-daily" | "mean_daily" | "mean" => Ok(AnnualizationMode::MeanDaily),
            "compounded" | "geometric" => Ok(AnnualizationMode::Compounded),
            _ => Err(CoreError::UnknownVariant {
                field: "annualization mode",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!("Date-Join".parse::<AlignmentMode>().unwrap(), AlignmentMode::DateJoin);
        assert_eq!("positional".parse::<AlignmentMode>().unwrap(), AlignmentMode::Positional);
        assert_eq!(
            "COMPOUNDED".parse::<AnnualizationMode>().unwrap(),
            AnnualizationMode::Compounded
        );
        assert_eq!(" close ".parse::<PriceField>().unwrap(), PriceField::Close);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "median".parse::<AnnualizationMode>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownVariant {
                field: "annualization mode",
                value: "median".to_string()
            }
        );
        assert!("adj_close".parse::<PriceField>().is_err());
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&AlignmentMode::DateJoin).unwrap();
        assert_eq!(json, "\"date-join\"");
        let mode: AnnualizationMode = serde_json::from_str("\"mean-daily\"").unwrap();
        assert_eq!(mode.to_string(), "mean-daily");
    }
}
