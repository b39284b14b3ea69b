//! Descriptive statistics
//!
//! [`describe`] reports a battery of location, dispersion, shape and quantile
//! statistics for one column, each with a bias-corrected companion where one
//! exists:
//!
//! | Statistic | Bias correction |
//! |-----------|-----------------|
//! | mean, trimmed mean, winsorized mean, median | jackknife |
//! | variance | `ddof = 1` |
//! | standard deviation | `s / c4(n)` |
//! | skewness, excess kurtosis | adjusted Fisher-Pearson `G1`, `G2` |
//! | weighted variance and standard deviation | reliability weights |
//!
//! Cells without a correction hold NaN. Values are never rounded.
//!
//! [`dataset_summary`] gives the per-column overview of a whole dataset.

mod describe;
pub mod moments;
mod summary;

pub use describe::{
    describe, describe_sample, quantile_label, DescriptiveOptions, DEFAULT_QUANTILES,
    DESCRIPTIVE_COLUMNS,
};
pub use summary::{dataset_summary, SUMMARY_COLUMNS};
