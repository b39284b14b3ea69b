//! Estimator descriptors
//!
//! A descriptor names one estimator together with its parameters. The
//! parameter set is fixed by the variant and checked exhaustively in
//! `validate`, so call sites never compare labels or re-check ranges.

use crate::{location, quantile, scale, EstimatorProperties, Statistic};
use serde::{Deserialize, Serialize};
use statbench_core::{Error, Result};
use std::str::FromStr;

/// Default trim fraction for the trimmed mean
pub const DEFAULT_TRIM: f64 = 0.1;
/// Default winsor limits
pub const DEFAULT_WINSOR_LIMITS: (f64, f64) = (0.1, 0.1);

/// Estimators of the centre in the mean family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "estimator", rename_all = "snake_case")]
pub enum MeanEstimator {
    SampleMean,
    TrimmedMean { alpha: f64 },
    WinsorizedMean { lower: f64, upper: f64 },
    WeightedMean,
}

/// Estimators of the centre in the median family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "estimator", rename_all = "snake_case")]
pub enum MedianEstimator {
    SampleMedian,
    HarrellDavis,
    HodgesLehmann,
    WeightedMedian,
}

/// Estimators of the spread σ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "estimator", rename_all = "snake_case")]
pub enum DeviationEstimator {
    StandardDeviation { ddof: usize },
    MedianAbsoluteDeviation,
    InterquartileRange,
}

impl Default for MeanEstimator {
    fn default() -> Self {
        Self::SampleMean
    }
}

impl Default for MedianEstimator {
    fn default() -> Self {
        Self::SampleMedian
    }
}

impl Default for DeviationEstimator {
    fn default() -> Self {
        Self::StandardDeviation { ddof: 1 }
    }
}

fn require_weights<'a>(weights: Option<&'a [f64]>, name: &str) -> Result<&'a [f64]> {
    weights.ok_or_else(|| {
        Error::InvalidInput(format!("{name} requires a weights column"))
    })
}

impl MeanEstimator {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::SampleMean | Self::WeightedMean => Ok(()),
            Self::TrimmedMean { alpha } => location::validate_trim(alpha),
            Self::WinsorizedMean { lower, upper } => location::validate_winsor_limits(lower, upper),
        }
    }

    /// Smallest sample size the estimator is offered for
    pub fn min_sample_size(&self) -> usize {
        match self {
            Self::SampleMean | Self::WeightedMean => 1,
            Self::TrimmedMean { .. } | Self::WinsorizedMean { .. } => 3,
        }
    }
}

impl EstimatorProperties for MeanEstimator {
    fn name(&self) -> String {
        match self {
            Self::SampleMean => "Sample Mean".to_string(),
            Self::TrimmedMean { alpha } => format!("Trimmed Mean ({alpha})"),
            Self::WinsorizedMean { lower, upper } => format!("Winsorized Mean ({lower}, {upper})"),
            Self::WeightedMean => "Weighted Mean".to_string(),
        }
    }

    fn breakdown_point(&self) -> f64 {
        match *self {
            Self::SampleMean | Self::WeightedMean => 0.0,
            Self::TrimmedMean { alpha } => alpha,
            Self::WinsorizedMean { lower, upper } => lower.min(upper),
        }
    }
}

impl Statistic for MeanEstimator {
    fn estimate(&self, values: &[f64], weights: Option<&[f64]>) -> Result<f64> {
        match *self {
            Self::SampleMean => location::mean(values),
            Self::TrimmedMean { alpha } => location::trimmed_mean(values, alpha),
            Self::WinsorizedMean { lower, upper } => location::winsorized_mean(values, lower, upper),
            Self::WeightedMean => {
                location::weighted_mean(values, require_weights(weights, "Weighted Mean")?)
            }
        }
    }

    fn requires_weights(&self) -> bool {
        matches!(self, Self::WeightedMean)
    }
}

impl FromStr for MeanEstimator {
    type Err = Error;

    /// Parse a selection-list label, with default parameters
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Sample Mean" => Ok(Self::SampleMean),
            "Trimmed Mean" => Ok(Self::TrimmedMean { alpha: DEFAULT_TRIM }),
            "Winsorized Mean" => Ok(Self::WinsorizedMean {
                lower: DEFAULT_WINSOR_LIMITS.0,
                upper: DEFAULT_WINSOR_LIMITS.1,
            }),
            "Weighted Mean" => Ok(Self::WeightedMean),
            other => Err(Error::InvalidParameter(format!("unknown mean estimator '{other}'"))),
        }
    }
}

impl MedianEstimator {
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }

    pub fn min_sample_size(&self) -> usize {
        1
    }
}

impl EstimatorProperties for MedianEstimator {
    fn name(&self) -> String {
        match self {
            Self::SampleMedian => "Sample Median",
            Self::HarrellDavis => "Harrell-Davis Median",
            Self::HodgesLehmann => "Hodges-Lehmann",
            Self::WeightedMedian => "Weighted Median",
        }
        .to_string()
    }

    fn is_robust(&self) -> bool {
        !matches!(self, Self::HarrellDavis)
    }

    fn breakdown_point(&self) -> f64 {
        match self {
            Self::SampleMedian | Self::WeightedMedian => 0.5,
            Self::HodgesLehmann => 0.293,
            Self::HarrellDavis => 0.0,
        }
    }
}

impl Statistic for MedianEstimator {
    fn estimate(&self, values: &[f64], weights: Option<&[f64]>) -> Result<f64> {
        match self {
            Self::SampleMedian => location::median(values),
            Self::HarrellDavis => quantile::harrell_davis(values, 0.5),
            Self::HodgesLehmann => location::hodges_lehmann(values),
            Self::WeightedMedian => {
                location::weighted_median(values, require_weights(weights, "Weighted Median")?)
            }
        }
    }

    fn requires_weights(&self) -> bool {
        matches!(self, Self::WeightedMedian)
    }
}

impl FromStr for MedianEstimator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Sample Median" => Ok(Self::SampleMedian),
            "Harrell-Davis Median" => Ok(Self::HarrellDavis),
            "Hodges-Lehmann" => Ok(Self::HodgesLehmann),
            "Weighted Median" => Ok(Self::WeightedMedian),
            other => Err(Error::InvalidParameter(format!("unknown median estimator '{other}'"))),
        }
    }
}

impl DeviationEstimator {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::StandardDeviation { ddof } => scale::validate_ddof(ddof),
            Self::MedianAbsoluteDeviation | Self::InterquartileRange => Ok(()),
        }
    }

    pub fn min_sample_size(&self) -> usize {
        match *self {
            Self::StandardDeviation { ddof } => ddof + 1,
            Self::MedianAbsoluteDeviation | Self::InterquartileRange => 2,
        }
    }
}

impl EstimatorProperties for DeviationEstimator {
    fn name(&self) -> String {
        match self {
            Self::StandardDeviation { ddof } => format!("Deviation ({ddof} ddof)"),
            Self::MedianAbsoluteDeviation => "MAD (normalized)".to_string(),
            Self::InterquartileRange => "IQR (normalized)".to_string(),
        }
    }

    fn breakdown_point(&self) -> f64 {
        match self {
            Self::StandardDeviation { .. } => 0.0,
            Self::MedianAbsoluteDeviation => 0.5,
            Self::InterquartileRange => 0.25,
        }
    }
}

impl Statistic for DeviationEstimator {
    fn estimate(&self, values: &[f64], _weights: Option<&[f64]>) -> Result<f64> {
        match *self {
            Self::StandardDeviation { ddof } => scale::std_dev(values, ddof),
            Self::MedianAbsoluteDeviation => scale::mad(values),
            Self::InterquartileRange => scale::normalized_iqr(values),
        }
    }
}

impl FromStr for DeviationEstimator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Deviation (1 ddof)" => Ok(Self::StandardDeviation { ddof: 1 }),
            "Deviation (0 ddof)" => Ok(Self::StandardDeviation { ddof: 0 }),
            "MAD (normalized)" => Ok(Self::MedianAbsoluteDeviation),
            "IQR (normalized)" => Ok(Self::InterquartileRange),
            other => Err(Error::InvalidParameter(format!(
                "unknown deviation estimator '{other}'"
            ))),
        }
    }
}

/// Estimators that can be offered for a sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimatorCatalog {
    pub means: Vec<MeanEstimator>,
    pub medians: Vec<MedianEstimator>,
    pub deviations: Vec<DeviationEstimator>,
}

/// List the estimators usable for a sample of size `n`
///
/// `n = 0` means "no data yet" and lists every estimator with default
/// parameters, which is what a selection list is populated with before a
/// column is chosen.
pub fn available_estimators(n: usize) -> EstimatorCatalog {
    let means = [
        MeanEstimator::SampleMean,
        MeanEstimator::TrimmedMean { alpha: DEFAULT_TRIM },
        MeanEstimator::WinsorizedMean {
            lower: DEFAULT_WINSOR_LIMITS.0,
            upper: DEFAULT_WINSOR_LIMITS.1,
        },
        MeanEstimator::WeightedMean,
    ];
    let medians = [
        MedianEstimator::SampleMedian,
        MedianEstimator::HarrellDavis,
        MedianEstimator::HodgesLehmann,
        MedianEstimator::WeightedMedian,
    ];
    let deviations = [
        DeviationEstimator::StandardDeviation { ddof: 1 },
        DeviationEstimator::StandardDeviation { ddof: 0 },
        DeviationEstimator::MedianAbsoluteDeviation,
        DeviationEstimator::InterquartileRange,
    ];
    let usable = |min: usize| n == 0 || n >= min;
    EstimatorCatalog {
        means: means.into_iter().filter(|e| usable(e.min_sample_size())).collect(),
        medians: medians.into_iter().filter(|e| usable(e.min_sample_size())).collect(),
        deviations: deviations
            .into_iter()
            .filter(|e| usable(e.min_sample_size()))
            .collect(),
    }
}
