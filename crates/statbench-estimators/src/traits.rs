//! Core traits for estimators

use statbench_core::Result;

/// Intrinsic properties of an estimator that don't depend on the data
pub trait EstimatorProperties {
    /// Display name including parameters, e.g. `Trimmed Mean (0.1)`
    fn name(&self) -> String;

    /// Check if this estimator is robust to outliers
    fn is_robust(&self) -> bool {
        self.breakdown_point() > 0.0
    }

    /// Asymptotic breakdown point (0.0 to 0.5)
    fn breakdown_point(&self) -> f64;
}

/// A scalar statistic of a sample, optionally weighted
///
/// Implementations are pure: the same values and weights always give the
/// same result, and nothing is mutated. Weights, when given, are aligned
/// with `values`; statistics that do not use weights ignore them.
pub trait Statistic: EstimatorProperties + Send + Sync {
    fn estimate(&self, values: &[f64], weights: Option<&[f64]>) -> Result<f64>;

    /// Whether [`Statistic::estimate`] fails without weights
    fn requires_weights(&self) -> bool {
        false
    }
}

/// Adapter turning a closure into a [`Statistic`]
pub struct FnStatistic<F> {
    name: String,
    f: F,
}

impl<F> FnStatistic<F>
where
    F: Fn(&[f64], Option<&[f64]>) -> Result<f64> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> EstimatorProperties for FnStatistic<F> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn breakdown_point(&self) -> f64 {
        0.0
    }
}

impl<F> Statistic for FnStatistic<F>
where
    F: Fn(&[f64], Option<&[f64]>) -> Result<f64> + Send + Sync,
{
    fn estimate(&self, values: &[f64], weights: Option<&[f64]>) -> Result<f64> {
        (self.f)(values, weights)
    }
}
