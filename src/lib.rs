//! # statbench
//!
//! Statistical computation engine behind an interactive analysis workbench.
//! The engine takes a dataset view plus the parameters a user picked and
//! returns full-precision result tables and renderable figures.
//!
//! ## Components
//!
//! - [`core`]: errors, dataset views, validation, tables and figures
//! - [`estimators`]: robust location and scale estimators
//! - [`confidence`]: bootstrap resampling, confidence/prediction intervals
//!   and joint (μ, σ) regions
//! - [`hypothesis`]: t-tests, variance equality and one-way ANOVA
//! - [`regression`]: OLS with formula support, prediction bands and
//!   diagnostic figures
//! - [`descriptive`]: bias-corrected descriptive statistics
//! - `polars` (feature `polars`): [`DatasetView`](core::DatasetView) for
//!   polars `DataFrame`s
//!
//! ## Example
//!
//! ```rust
//! use statbench::prelude::*;
//!
//! let dataset = Dataset::new()
//!     .with_numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])
//!     .unwrap()
//!     .with_numeric("y", vec![2.0, 4.0, 5.0, 4.0, 5.0])
//!     .unwrap();
//! let session = Session::with_dataset(dataset);
//!
//! let report = run_linear_regression(
//!     session.dataset().unwrap(),
//!     &RegressionRequest::new("y", ["x"]),
//! )
//! .unwrap();
//! assert!((report.coefficients.get("x", "Coef.").unwrap() - 0.6).abs() < 1e-12);
//! ```

pub use statbench_confidence as confidence;
pub use statbench_core as core;
pub use statbench_descriptive as descriptive;
pub use statbench_estimators as estimators;
pub use statbench_hypothesis as hypothesis;
pub use statbench_regression as regression;

#[cfg(feature = "polars")]
pub use statbench_polars as polars;

pub mod prelude {
    pub use statbench_core::{
        validation, ConfidenceLevel, Dataset, DatasetView, Error, Figure, Layer, Result,
        ResultTable, Sample, Session, WeightedSample,
    };

    pub use statbench_confidence::{
        confidence_regions, interval_report, run_confidence_intervals, run_confidence_regions,
        Bootstrap, IntervalMethod, IntervalRequest, IntervalTarget, RegionRequest,
    };
    pub use statbench_descriptive::{dataset_summary, describe, DescriptiveOptions};
    pub use statbench_hypothesis::{
        run_hypothesis_test, Alternative, GroupSelector, HypothesisTest, TestOptions, TestOutcome,
        VarianceTestKind,
    };
    pub use statbench_regression::{
        run_linear_regression, Formula, PlotOptions, PredictionGrid, RegressionPlot,
        RegressionRequest,
    };
}
