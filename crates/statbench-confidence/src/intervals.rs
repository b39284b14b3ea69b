//! Confidence intervals for location and scale
//!
//! Each statistic (mean family, median family, deviation) is toggled to the
//! bootstrap independently. Without the toggle an analytic interval is used
//! where one exists for the chosen estimator; every other estimator falls
//! back to the bootstrap. The method actually used is recorded on each
//! interval.

use crate::{
    asymptotic,
    bootstrap::{validate_resamples, Bootstrap, BootstrapDistribution, DEFAULT_RESAMPLES},
    ConfidenceInterval,
};
use serde::{Deserialize, Serialize};
use statbench_core::{
    sample::validate_weights, validation, ConfidenceLevel, DatasetView, Error, ResultTable, Result,
};
use statbench_estimators::{
    DeviationEstimator, EstimatorProperties, MeanEstimator, MedianEstimator, Statistic,
};
use tracing::{debug, instrument};

/// Which statistics use the bootstrap instead of an analytic interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapToggles {
    pub mean: bool,
    pub median: bool,
    pub deviation: bool,
    pub prediction: bool,
}

impl BootstrapToggles {
    pub fn all() -> Self {
        Self {
            mean: true,
            median: true,
            deviation: true,
            prediction: true,
        }
    }
}

/// Estimator selection, bootstrap toggles and level shared by the interval,
/// prediction and region operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalRequest {
    pub level: ConfidenceLevel,
    pub mean: MeanEstimator,
    pub median: MedianEstimator,
    pub deviation: DeviationEstimator,
    pub bootstrap: BootstrapToggles,
    pub n_resamples: usize,
    pub seed: Option<u64>,
}

impl Default for IntervalRequest {
    fn default() -> Self {
        Self {
            level: ConfidenceLevel::NINETY_FIVE,
            mean: MeanEstimator::default(),
            median: MedianEstimator::default(),
            deviation: DeviationEstimator::default(),
            bootstrap: BootstrapToggles::default(),
            n_resamples: DEFAULT_RESAMPLES,
            seed: None,
        }
    }
}

impl IntervalRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: ConfidenceLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_mean(mut self, estimator: MeanEstimator) -> Self {
        self.mean = estimator;
        self
    }

    pub fn with_median(mut self, estimator: MedianEstimator) -> Self {
        self.median = estimator;
        self
    }

    pub fn with_deviation(mut self, estimator: DeviationEstimator) -> Self {
        self.deviation = estimator;
        self
    }

    pub fn with_bootstrap(mut self, toggles: BootstrapToggles) -> Self {
        self.bootstrap = toggles;
        self
    }

    pub fn with_resamples(mut self, n_resamples: usize) -> Self {
        self.n_resamples = n_resamples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate every estimator descriptor and the resample count
    pub fn validate(&self) -> Result<()> {
        self.mean.validate()?;
        self.median.validate()?;
        self.deviation.validate()?;
        validate_resamples(self.n_resamples)
    }

    /// Fail early when a weighted estimator is chosen without weights
    pub(crate) fn check_weights(&self, weights: Option<&[f64]>, n: usize) -> Result<()> {
        match weights {
            Some(w) => validate_weights(w, n),
            None => {
                let needs = [
                    (self.mean.requires_weights(), self.mean.name()),
                    (self.median.requires_weights(), self.median.name()),
                ];
                match needs.into_iter().find(|(needs, _)| *needs) {
                    Some((_, name)) => Err(Error::InvalidInput(format!(
                        "{name} requires a weights column"
                    ))),
                    None => Ok(()),
                }
            }
        }
    }

    pub(crate) fn bootstrap(&self) -> Result<Bootstrap> {
        Ok(Bootstrap::new(self.n_resamples)?.with_optional_seed(self.seed))
    }
}

/// The statistic an interval is built for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalTarget {
    Mean(MeanEstimator),
    Median(MedianEstimator),
    Deviation(DeviationEstimator),
}

impl IntervalTarget {
    /// Family label used in table rows
    pub fn family(&self) -> &'static str {
        match self {
            Self::Mean(_) => "Mean",
            Self::Median(_) => "Median",
            Self::Deviation(_) => "Deviation",
        }
    }

    pub fn statistic(&self) -> &dyn Statistic {
        match self {
            Self::Mean(e) => e,
            Self::Median(e) => e,
            Self::Deviation(e) => e,
        }
    }

    /// Whether a closed-form interval exists for this estimator
    pub fn has_analytic_interval(&self) -> bool {
        matches!(
            self,
            Self::Mean(MeanEstimator::SampleMean)
                | Self::Median(MedianEstimator::SampleMedian | MedianEstimator::HarrellDavis)
                | Self::Deviation(DeviationEstimator::StandardDeviation { .. })
        )
    }
}

#[derive(Debug, Clone)]
enum Basis {
    Analytic,
    Bootstrap(Bootstrap, BootstrapDistribution),
}

/// Interval machinery prepared once and read at any number of levels
///
/// Bootstrap resampling happens during preparation, so reading intervals at
/// several levels reuses one distribution.
#[derive(Debug, Clone)]
pub struct PreparedInterval {
    target: IntervalTarget,
    values: Vec<f64>,
    estimate: f64,
    basis: Basis,
}

impl PreparedInterval {
    #[instrument(skip(values, weights, bootstrap), fields(n = values.len(), family = target.family()))]
    pub fn prepare(
        target: IntervalTarget,
        values: &[f64],
        weights: Option<&[f64]>,
        force_bootstrap: bool,
        bootstrap: &Bootstrap,
    ) -> Result<Self> {
        let statistic = target.statistic();
        let estimate = statistic.estimate(values, weights)?;
        let basis = if force_bootstrap || !target.has_analytic_interval() {
            debug!(estimator = %statistic.name(), "using bootstrap interval");
            let distribution = bootstrap.distribution(values, weights, statistic)?;
            Basis::Bootstrap(bootstrap.clone(), distribution)
        } else {
            debug!(estimator = %statistic.name(), "using analytic interval");
            Basis::Analytic
        };
        Ok(Self {
            target,
            values: values.to_vec(),
            estimate,
            basis,
        })
    }

    pub fn target(&self) -> IntervalTarget {
        self.target
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    /// Interval at `level`
    pub fn interval(&self, level: ConfidenceLevel) -> Result<ConfidenceInterval> {
        match &self.basis {
            Basis::Bootstrap(bootstrap, distribution) => {
                bootstrap.interval_from(distribution, self.estimate, level)
            }
            Basis::Analytic => match self.target {
                IntervalTarget::Mean(_) => asymptotic::mean_interval(&self.values, level),
                IntervalTarget::Median(MedianEstimator::HarrellDavis) => {
                    asymptotic::maritz_jarrett_interval(&self.values, level)
                }
                IntervalTarget::Median(_) => {
                    asymptotic::median_order_statistic_interval(&self.values, level)
                }
                IntervalTarget::Deviation(DeviationEstimator::StandardDeviation { ddof }) => {
                    asymptotic::std_dev_interval(&self.values, ddof, level)
                }
                IntervalTarget::Deviation(other) => Err(Error::Computation(format!(
                    "no analytic interval for {}",
                    other.name()
                ))),
            },
        }
    }

    /// Table row label, e.g. `Mean CI (Sample Mean, analytic)`
    pub fn row_label(&self, kind: &str, interval: &ConfidenceInterval) -> String {
        format!(
            "{} {kind} ({}, {})",
            self.target.family(),
            self.target.statistic().name(),
            interval.method
        )
    }
}

/// Mean, median and deviation intervals of one sample
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSummary {
    pub mean: ConfidenceInterval,
    pub median: ConfidenceInterval,
    pub deviation: ConfidenceInterval,
    labels: [String; 3],
}

impl IntervalSummary {
    /// Result table with one row per interval
    pub fn to_table(&self) -> Result<ResultTable> {
        let mut table = ResultTable::new(ConfidenceInterval::TABLE_COLUMNS);
        for (label, ci) in self.labels.iter().zip([&self.mean, &self.median, &self.deviation]) {
            table.push_row(label.clone(), ci.table_values())?;
        }
        Ok(table)
    }
}

/// Confidence intervals for the chosen mean, median and deviation estimators
///
/// # Example
///
/// ```rust
/// use statbench_confidence::{confidence_intervals, IntervalRequest};
///
/// let data: Vec<f64> = (1..=30).map(|i| i as f64 * 0.5).collect();
/// let summary = confidence_intervals(&data, None, &IntervalRequest::default().with_seed(1)).unwrap();
/// assert!(summary.mean.contains(summary.mean.estimate));
/// assert!(!summary.mean.method.is_bootstrap());
/// ```
#[instrument(skip(values, weights, request), fields(n = values.len()))]
pub fn confidence_intervals(
    values: &[f64],
    weights: Option<&[f64]>,
    request: &IntervalRequest,
) -> Result<IntervalSummary> {
    request.validate()?;
    request.check_weights(weights, values.len())?;
    let bootstrap = request.bootstrap()?;
    let toggles = request.bootstrap;

    let prepared = [
        PreparedInterval::prepare(IntervalTarget::Mean(request.mean), values, weights, toggles.mean, &bootstrap)?,
        PreparedInterval::prepare(
            IntervalTarget::Median(request.median),
            values,
            weights,
            toggles.median,
            &bootstrap,
        )?,
        PreparedInterval::prepare(
            IntervalTarget::Deviation(request.deviation),
            values,
            weights,
            toggles.deviation,
            &bootstrap,
        )?,
    ];
    let intervals = prepared
        .iter()
        .map(|p| p.interval(request.level))
        .collect::<Result<Vec<_>>>()?;
    let labels = [0, 1, 2].map(|i| prepared[i].row_label("CI", &intervals[i]));

    Ok(IntervalSummary {
        mean: intervals[0],
        median: intervals[1],
        deviation: intervals[2],
        labels,
    })
}

/// Read the column (and optional weights column) from a dataset view and
/// compute its confidence intervals
pub fn run_confidence_intervals<D: DatasetView + ?Sized>(
    dataset: &D,
    column: &str,
    weights_column: Option<&str>,
    request: &IntervalRequest,
) -> Result<IntervalSummary> {
    match weights_column {
        Some(weights_column) => {
            let sample = validation::weighted_sample(dataset, column, weights_column)?;
            confidence_intervals(sample.values(), Some(sample.weights()), request)
        }
        None => {
            let sample = validation::numeric_sample(dataset, column)?;
            confidence_intervals(sample.values(), None, request)
        }
    }
}
