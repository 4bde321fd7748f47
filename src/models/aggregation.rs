use crate::error::{ProcessingError, Result};
use crate::utils::constants::{AGGREGATION_MAX, AGGREGATION_MEAN, AGGREGATION_MIN};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reduction applied when the wide files were produced; its name is embedded in column headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Min,
    Max,
    Mean,
}

impl Aggregation {
    pub const ALL: [Aggregation; 3] = [Aggregation::Min, Aggregation::Max, Aggregation::Mean];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Min => AGGREGATION_MIN,
            Aggregation::Max => AGGREGATION_MAX,
            Aggregation::Mean => AGGREGATION_MEAN,
        }
    }

    /// Whether a wide column header carries this aggregation
    pub fn matches_column(&self, column: &str) -> bool {
        column.contains(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            AGGREGATION_MIN => Ok(Aggregation::Min),
            AGGREGATION_MAX => Ok(Aggregation::Max),
            AGGREGATION_MEAN => Ok(Aggregation::Mean),
            other => Err(ProcessingError::UnknownAggregation(other.to_string())),
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies which combined output file an aggregated part contributes to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinedKey {
    pub geography: String,
    pub aggregation: Aggregation,
    pub measure: String,
}

impl CombinedKey {
    pub fn new(geography: &str, aggregation: Aggregation, measure: &str) -> Self {
        Self {
            geography: geography.to_string(),
            aggregation,
            measure: measure.to_string(),
        }
    }
}

impl std::fmt::Display for CombinedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.geography, self.aggregation, self.measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_from_str() {
        assert_eq!("min".parse::<Aggregation>().unwrap(), Aggregation::Min);
        assert_eq!("MAX".parse::<Aggregation>().unwrap(), Aggregation::Max);
        assert_eq!(" mean ".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert!("median".parse::<Aggregation>().is_err());
    }

    #[test]
    fn test_matches_column() {
        assert!(Aggregation::Min.matches_column("20100101_prcp_min"));
        assert!(!Aggregation::Max.matches_column("20100101_prcp_min"));
        assert!(Aggregation::Mean.matches_column("20100101_mean"));
        assert!(!Aggregation::Min.matches_column("20100101_mean"));
    }

    #[test]
    fn test_combined_key_display() {
        let key = CombinedKey::new("esri19uszip5", Aggregation::Max, "tmin");
        assert_eq!(key.to_string(), "esri19uszip5 max tmin");
    }
}
