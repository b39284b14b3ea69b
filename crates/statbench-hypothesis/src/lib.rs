//! Hypothesis tests over dataset columns
//!
//! Four test families sit behind one dispatcher:
//!
//! - **One-sample t-test** against a hypothesised mean μ₀
//! - **Two-sample t-test** between two category-filtered groups, pooled or
//!   Welch-corrected
//! - **Variance equality** between two groups by Bartlett or median-centred
//!   Levene
//! - **One-way ANOVA** across the selected levels of a factor
//!
//! [`HypothesisTest`] is a closed enum, so [`run_hypothesis_test`] matches
//! every variant exhaustively. Each run validates its inputs, computes a
//! [`TestResult`], builds a full-precision table and, when requested, a
//! companion figure.

mod anova;
mod dispatch;
mod figures;
mod types;
mod variance;

pub use anova::{one_way_anova, OneWayAnova, ANOVA_COLUMNS};
pub use dispatch::{run_hypothesis_test, HypothesisTest};
pub use t_test::{one_sample_t_test, two_sample_t_test, OneSampleTTest, TwoSampleTTest};
pub use types::{
    Alternative, Decision, GroupSelector, HypothesisTestKind, TestOptions, TestOutcome,
    TestResult, TwoSamplePlot, VarianceTestKind,
};
pub use variance::{bartlett, levene, variance_test, VarianceTest};
