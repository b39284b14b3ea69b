//! Location and scale estimators
//!
//! This crate provides the interchangeable point estimators used by the
//! interval, test and descriptive components:
//!
//! - **Location**: sample mean, trimmed mean, winsorized mean, weighted mean,
//!   sample median, Harrell-Davis median, Hodges-Lehmann, weighted median
//! - **Scale**: standard deviation with `ddof`, normalized MAD, normalized IQR
//!
//! Each estimator is a pure function in [`location`], [`scale`] or
//! [`quantile`]. The descriptor enums in [`descriptor`] pair an estimator with
//! its parameters, validate them up front, and implement [`Statistic`] so the
//! bootstrap can apply any of them to resamples.
//!
//! # Example
//!
//! ```rust
//! use statbench_estimators::{MeanEstimator, Statistic};
//!
//! let estimator = MeanEstimator::TrimmedMean { alpha: 0.2 };
//! estimator.validate().unwrap();
//! let value = estimator.estimate(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], None).unwrap();
//! assert_eq!(value, 3.5);
//! ```

pub mod descriptor;
pub mod location;
pub mod quantile;
pub mod scale;
mod traits;

pub use descriptor::{
    available_estimators, DeviationEstimator, EstimatorCatalog, MeanEstimator, MedianEstimator,
    DEFAULT_TRIM, DEFAULT_WINSOR_LIMITS,
};
pub use quantile::HarrellDavisMoments;
pub use traits::{EstimatorProperties, FnStatistic, Statistic};
