//! Common types for confidence intervals

use serde::Serialize;
use std::fmt;

/// How the bounds of an interval were derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum IntervalMethod {
    /// Closed-form sampling distribution
    Analytic,
    /// Percentiles of a bootstrap distribution with this many resamples
    Bootstrap { resamples: usize },
}

impl IntervalMethod {
    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap { .. })
    }

    /// Resample count, `None` for analytic intervals
    pub fn resamples(&self) -> Option<usize> {
        match self {
            Self::Analytic => None,
            Self::Bootstrap { resamples } => Some(*resamples),
        }
    }
}

impl fmt::Display for IntervalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analytic => write!(f, "analytic"),
            Self::Bootstrap { resamples } => write!(f, "bootstrap, B={resamples}"),
        }
    }
}

/// A confidence interval with lower and upper bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Lower bound of the interval
    pub lower: f64,
    /// Upper bound of the interval
    pub upper: f64,
    /// The point estimate
    pub estimate: f64,
    /// Confidence level (e.g., 0.95 for 95% CI)
    pub confidence_level: f64,
    pub method: IntervalMethod,
}

impl ConfidenceInterval {
    pub fn new(
        lower: f64,
        upper: f64,
        estimate: f64,
        confidence_level: f64,
        method: IntervalMethod,
    ) -> Self {
        Self {
            lower,
            upper,
            estimate,
            confidence_level,
            method,
        }
    }

    /// Interval with analytic bounds
    pub fn analytic(lower: f64, upper: f64, estimate: f64, confidence_level: f64) -> Self {
        Self::new(lower, upper, estimate, confidence_level, IntervalMethod::Analytic)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Closed-interval membership
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    /// Table columns matching [`ConfidenceInterval::table_values`]
    pub const TABLE_COLUMNS: [&'static str; 5] =
        ["Estimate", "Lower", "Upper", "Confidence Level", "Resamples"];

    /// Row values for a result table; `Resamples` is NaN for analytic bounds
    pub fn table_values(&self) -> Vec<f64> {
        vec![
            self.estimate,
            self.lower,
            self.upper,
            self.confidence_level,
            self.method.resamples().map_or(f64::NAN, |b| b as f64),
        ]
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% CI: [{}, {}], estimate: {} ({})",
            self.confidence_level * 100.0,
            self.lower,
            self.upper,
            self.estimate,
            self.method
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_interval() {
        let ci = ConfidenceInterval::analytic(2.0, 8.0, 5.0, 0.95);

        assert_eq!(ci.width(), 6.0);
        assert!(ci.contains(2.0));
        assert!(ci.contains(8.0));
        assert!(!ci.contains(1.0));
        assert!(!ci.contains(8.5));
    }

    #[test]
    fn test_method_tag_in_table_values() {
        let analytic = ConfidenceInterval::analytic(1.0, 3.0, 2.0, 0.9);
        assert!(analytic.table_values()[4].is_nan());

        let boot = ConfidenceInterval::new(
            1.0,
            3.0,
            2.0,
            0.9,
            IntervalMethod::Bootstrap { resamples: 1000 },
        );
        assert_eq!(boot.table_values()[4], 1000.0);
        assert!(boot.to_string().contains("bootstrap, B=1000"));
    }
}
