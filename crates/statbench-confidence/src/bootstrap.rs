//! Bootstrap resampling engine
//!
//! Draws B resamples with replacement from a one-dimensional sample, keeping
//! each value paired with its weight, applies a [`Statistic`] to every
//! resample and returns the resulting distribution. Each resample gets its
//! own RNG seeded from `base_seed + i`, so the distribution is the same
//! whether resamples run sequentially or across rayon worker threads.

use crate::{bootstrap_methods::PercentileBootstrap, ConfidenceInterval};
use rand::prelude::*;
use statbench_core::{math, ConfidenceLevel, Error, Result};
use statbench_estimators::Statistic;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Smallest resample count accepted by the interval operations
pub const MIN_RESAMPLES: usize = 100;
/// Largest resample count accepted by the interval operations
pub const MAX_RESAMPLES: usize = 5000;
/// Default number of bootstrap resamples
pub const DEFAULT_RESAMPLES: usize = 1000;

/// Bootstrap method for calculating confidence intervals
///
/// This trait defines how to construct a confidence interval from
/// bootstrap estimates.
pub trait BootstrapMethod: Clone + Send + Sync {
    /// Calculate confidence interval from a sorted bootstrap distribution
    fn calculate_interval(
        &self,
        sorted_estimates: &[f64],
        original_estimate: f64,
        level: ConfidenceLevel,
    ) -> Result<ConfidenceInterval>;

    /// Method name for documentation
    fn name(&self) -> &'static str;
}

/// Check a resample count against the accepted range
pub fn validate_resamples(n_resamples: usize) -> Result<()> {
    if !(MIN_RESAMPLES..=MAX_RESAMPLES).contains(&n_resamples) {
        return Err(Error::InvalidParameter(format!(
            "number of bootstrap resamples {n_resamples} must be in [{MIN_RESAMPLES}, {MAX_RESAMPLES}]"
        )));
    }
    Ok(())
}

/// Empirical distribution of a statistic over B resamples
///
/// Estimates are kept sorted; the original resample order carries no
/// information for percentile computation.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapDistribution {
    sorted: Vec<f64>,
    failed: usize,
}

impl BootstrapDistribution {
    pub fn from_estimates(mut estimates: Vec<f64>) -> Result<Self> {
        if estimates.is_empty() {
            return Err(Error::InvalidInput("No bootstrap estimates".to_string()));
        }
        if estimates.iter().any(|x| !x.is_finite()) {
            return Err(Error::non_finite("bootstrap distribution"));
        }
        estimates.sort_by(|a, b| a.total_cmp(b));
        Ok(Self {
            sorted: estimates,
            failed: 0,
        })
    }

    /// Number of resamples B
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Resamples on which the statistic failed and the original estimate
    /// was used instead
    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn sorted_estimates(&self) -> &[f64] {
        &self.sorted
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    pub fn mean(&self) -> f64 {
        math::mean(&self.sorted)
    }

    /// Linear-interpolation quantile of the distribution
    pub fn quantile(&self, p: f64) -> Result<f64> {
        math::quantile_sorted(&self.sorted, p)
    }
}

/// Bootstrap resampler
///
/// # Example
///
/// ```rust
/// use statbench_confidence::Bootstrap;
/// use statbench_core::ConfidenceLevel;
/// use statbench_estimators::MeanEstimator;
///
/// let data = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.1];
/// let bootstrap = Bootstrap::new(500).unwrap().with_seed(7);
/// let ci = bootstrap
///     .confidence_interval(&data, None, &MeanEstimator::SampleMean, ConfidenceLevel::NINETY_FIVE)
///     .unwrap();
/// assert!(ci.lower <= ci.upper);
/// assert_eq!(ci.method.resamples(), Some(500));
/// ```
#[derive(Debug, Clone)]
pub struct Bootstrap<M = PercentileBootstrap> {
    method: M,
    n_resamples: usize,
    seed: Option<u64>,
}

impl Bootstrap<PercentileBootstrap> {
    /// Percentile bootstrap with `n_resamples` draws
    pub fn new(n_resamples: usize) -> Result<Self> {
        if n_resamples == 0 {
            return Err(Error::InvalidParameter(
                "Number of resamples must be positive".to_string(),
            ));
        }
        Ok(Self {
            method: PercentileBootstrap,
            n_resamples,
            seed: None,
        })
    }
}

impl<M: BootstrapMethod> Bootstrap<M> {
    /// Use a different interval method
    pub fn with_method<N: BootstrapMethod>(self, method: N) -> Bootstrap<N> {
        Bootstrap {
            method,
            n_resamples: self.n_resamples,
            seed: self.seed,
        }
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Optional seed; `None` draws a fresh base seed per call
    pub fn with_optional_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_resamples(&self) -> usize {
        self.n_resamples
    }

    pub fn method(&self) -> &M {
        &self.method
    }

    /// Run `replicate` once per resample with that resample's RNG
    ///
    /// A replicate that fails contributes `fallback` instead; the number of
    /// such substitutions is reported on the distribution.
    pub fn replicate<F>(&self, fallback: f64, replicate: F) -> Result<BootstrapDistribution>
    where
        F: Fn(&mut StdRng) -> Result<f64> + Send + Sync,
    {
        let base_seed = self.seed.unwrap_or_else(|| thread_rng().gen());
        let run = |i: usize| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            match replicate(&mut rng) {
                Ok(value) if value.is_finite() => (value, false),
                _ => (fallback, true),
            }
        };

        #[cfg(feature = "parallel")]
        let results: Vec<(f64, bool)> = (0..self.n_resamples).into_par_iter().map(run).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<(f64, bool)> = (0..self.n_resamples).map(run).collect();

        let failed = results.iter().filter(|(_, f)| *f).count();
        if failed > 0 {
            warn!(
                failed,
                n_resamples = self.n_resamples,
                "statistic failed on some resamples; substituted the original estimate"
            );
        }
        let mut distribution =
            BootstrapDistribution::from_estimates(results.into_iter().map(|(v, _)| v).collect())?;
        distribution.failed = failed;
        Ok(distribution)
    }

    /// Bootstrap distribution of `statistic` over resamples of `values`
    ///
    /// When weights are given each drawn value carries its own weight into
    /// the resample. Fails with `InsufficientData` for fewer than two
    /// observations.
    #[instrument(skip(self, values, weights, statistic),
                 fields(n = values.len(), n_resamples = self.n_resamples, statistic = %statistic.name()))]
    pub fn distribution<S>(
        &self,
        values: &[f64],
        weights: Option<&[f64]>,
        statistic: &S,
    ) -> Result<BootstrapDistribution>
    where
        S: Statistic + ?Sized,
    {
        let n = values.len();
        if n < 2 {
            return Err(Error::InsufficientData {
                expected: 2,
                actual: n,
            });
        }
        if let Some(w) = weights {
            statbench_core::sample::validate_weights(w, n)?;
        }

        let original = statistic.estimate(values, weights)?;
        debug!("Running bootstrap with {} resamples", self.n_resamples);

        self.replicate(original, |rng| {
            let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let resampled: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
            match weights {
                Some(w) => {
                    let resampled_weights: Vec<f64> = indices.iter().map(|&i| w[i]).collect();
                    statistic.estimate(&resampled, Some(&resampled_weights))
                }
                None => statistic.estimate(&resampled, None),
            }
        })
    }

    /// Interval for `statistic` from its bootstrap distribution
    pub fn confidence_interval<S>(
        &self,
        values: &[f64],
        weights: Option<&[f64]>,
        statistic: &S,
        level: ConfidenceLevel,
    ) -> Result<ConfidenceInterval>
    where
        S: Statistic + ?Sized,
    {
        let estimate = statistic.estimate(values, weights)?;
        let distribution = self.distribution(values, weights, statistic)?;
        self.interval_from(&distribution, estimate, level)
    }

    /// Interval from an existing distribution, e.g. to read several levels
    /// off one set of resamples
    pub fn interval_from(
        &self,
        distribution: &BootstrapDistribution,
        estimate: f64,
        level: ConfidenceLevel,
    ) -> Result<ConfidenceInterval> {
        self.method
            .calculate_interval(distribution.sorted_estimates(), estimate, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statbench_estimators::{FnStatistic, MeanEstimator};

    #[test]
    fn test_resample_count_is_respected() {
        let data: Vec<f64> = (1..=20).map(f64::from).collect();
        let bootstrap = Bootstrap::new(137).unwrap().with_seed(1);
        let dist = bootstrap
            .distribution(&data, None, &MeanEstimator::SampleMean)
            .unwrap();
        assert_eq!(dist.len(), 137);
        assert_eq!(dist.failed(), 0);
    }

    #[test]
    fn test_seed_makes_distribution_reproducible() {
        let data: Vec<f64> = (1..=30).map(|i| (i as f64).sqrt()).collect();
        let a = Bootstrap::new(200)
            .unwrap()
            .with_seed(99)
            .distribution(&data, None, &MeanEstimator::SampleMean)
            .unwrap();
        let b = Bootstrap::new(200)
            .unwrap()
            .with_seed(99)
            .distribution(&data, None, &MeanEstimator::SampleMean)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insufficient_data() {
        let bootstrap = Bootstrap::new(100).unwrap();
        let err = bootstrap
            .distribution(&[1.0], None, &MeanEstimator::SampleMean)
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientData { expected: 2, actual: 1 }));
        assert!(Bootstrap::new(0).is_err());
    }

    #[test]
    fn test_weights_travel_with_values() {
        // Only the value 10 carries weight, so every weighted resample that
        // contains it has mean 10; resamples without it fail and fall back.
        let values = [1.0, 10.0];
        let weights = [0.0, 1.0];
        let dist = Bootstrap::new(200)
            .unwrap()
            .with_seed(3)
            .distribution(&values, Some(&weights), &MeanEstimator::WeightedMean)
            .unwrap();
        assert!(dist.sorted_estimates().iter().all(|&x| x == 10.0));
        assert!(dist.failed() > 0);
    }

    #[test]
    fn test_replicate_with_custom_statistic() {
        let stat = FnStatistic::new("max", |v: &[f64], _: Option<&[f64]>| {
            Ok(v.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
        });
        let data = [1.0, 2.0, 3.0];
        let dist = Bootstrap::new(100)
            .unwrap()
            .with_seed(5)
            .distribution(&data, None, &stat)
            .unwrap();
        assert!(dist.min() >= 1.0 && dist.max() <= 3.0);
    }

    #[test]
    fn test_validate_resamples() {
        assert!(validate_resamples(100).is_ok());
        assert!(validate_resamples(5000).is_ok());
        assert!(matches!(validate_resamples(99), Err(Error::InvalidParameter(_))));
        assert!(validate_resamples(5001).is_err());
    }
}
