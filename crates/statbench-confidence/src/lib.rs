//! Bootstrap resampling, confidence intervals and confidence regions
//!
//! This crate builds interval estimates on top of the estimator library:
//!
//! - **Bootstrap**: seeded, optionally parallel resampling that preserves
//!   weight-value pairing, with percentile intervals
//! - **Analytic intervals**: Student t for the mean, order statistics and
//!   Maritz-Jarrett for medians, chi-square for the standard deviation
//! - **Prediction intervals**: for one new observation, analytic or bootstrap
//! - **Confidence regions**: nested likelihood contours over (μ, σ)
//!
//! Every interval records whether it is analytic or bootstrap, and the
//! resample count in the latter case.
//!
//! # Example
//!
//! ```rust
//! use statbench_confidence::{confidence_intervals, BootstrapToggles, IntervalRequest};
//! use statbench_estimators::MedianEstimator;
//!
//! let data = [4.2, 3.9, 5.1, 4.8, 4.4, 6.0, 3.7, 4.9, 5.3, 4.1, 4.6, 5.0];
//! let request = IntervalRequest::default()
//!     .with_median(MedianEstimator::HodgesLehmann)
//!     .with_bootstrap(BootstrapToggles { deviation: true, ..Default::default() })
//!     .with_seed(42);
//! let summary = confidence_intervals(&data, None, &request).unwrap();
//!
//! assert!(!summary.mean.method.is_bootstrap());
//! assert!(summary.median.method.is_bootstrap());
//! assert_eq!(summary.deviation.method.resamples(), Some(1000));
//! ```

pub mod asymptotic;
mod bootstrap;
mod bootstrap_methods;
mod intervals;
mod prediction;
mod region;
mod types;

pub use bootstrap::{
    validate_resamples, Bootstrap, BootstrapDistribution, BootstrapMethod, DEFAULT_RESAMPLES,
    MAX_RESAMPLES, MIN_RESAMPLES,
};
pub use bootstrap_methods::PercentileBootstrap;
pub use intervals::{
    confidence_intervals, run_confidence_intervals, BootstrapToggles, IntervalRequest,
    IntervalSummary, IntervalTarget, PreparedInterval,
};
pub use prediction::{interval_report, prediction_intervals, PredictionSummary};
pub use region::{
    confidence_regions, run_confidence_regions, ConfidenceRegion, MuCiSource, RegionEstimate,
    RegionRequest, RegionSet, DEFAULT_REGION_LEVELS, REGION_COLUMNS,
};
pub use statbench_core::ConfidenceLevel;
pub use types::{ConfidenceInterval, IntervalMethod};
