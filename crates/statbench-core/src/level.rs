//! Confidence level type with validation

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Confidence level strictly inside (0, 1)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// Create a new confidence level, failing if it is not in (0, 1)
    pub fn new(level: f64) -> Result<Self> {
        if level > 0.0 && level < 1.0 {
            Ok(Self(level))
        } else {
            Err(Error::invalid_level(level))
        }
    }

    /// Parse a confidence level typed as text, e.g. `"0.95"`
    ///
    /// Text that is not a number is `InvalidInput`; a number outside
    /// (0, 1) is `InvalidParameter`.
    pub fn parse(text: &str) -> Result<Self> {
        let value = crate::validation::parse_number(text, "confidence level")?;
        Self::new(value)
    }

    /// Get the confidence level value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Get the alpha level (1 - confidence level)
    pub fn alpha(&self) -> f64 {
        1.0 - self.0
    }

    /// Get the tail probability (alpha/2 for two-tailed)
    pub fn tail_probability(&self) -> f64 {
        self.alpha() / 2.0
    }

    pub const NINETY: Self = Self(0.90);
    pub const NINETY_FIVE: Self = Self(0.95);
    pub const NINETY_NINE: Self = Self(0.99);
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::NINETY_FIVE
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = Error;

    fn try_from(level: f64) -> Result<Self> {
        Self::new(level)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.0
    }
}

impl FromStr for ConfidenceLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_level() {
        let level = ConfidenceLevel::new(0.95).unwrap();
        assert_eq!(level.value(), 0.95);
        assert!((level.alpha() - 0.05).abs() < 1e-10);
        assert!((level.tail_probability() - 0.025).abs() < 1e-10);
    }

    #[test]
    fn test_out_of_range_is_invalid_parameter() {
        for bad in [0.0, 1.0, 1.5, -0.2, f64::NAN] {
            let err = ConfidenceLevel::new(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "{bad}");
        }
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(ConfidenceLevel::parse(" 0.9 ").unwrap().value(), 0.9);
        assert!(matches!(
            ConfidenceLevel::parse("1.5"),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            ConfidenceLevel::parse("ninety"),
            Err(Error::InvalidInput(_))
        ));
        let level: ConfidenceLevel = "0.99".parse().unwrap();
        assert_eq!(level, ConfidenceLevel::NINETY_NINE);
    }

    #[test]
    fn test_serde_validates() {
        let level: ConfidenceLevel = serde_json::from_str("0.9").unwrap();
        assert_eq!(level.value(), 0.9);
        assert!(serde_json::from_str::<ConfidenceLevel>("2.0").is_err());
    }
}
