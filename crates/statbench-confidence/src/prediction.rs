//! Prediction intervals for a single new observation
//!
//! Analytic intervals take the form `center ± t_{1-α/2, n-1} · s · √(1 + 1/n)`
//! where `s` comes from the chosen deviation estimator. The bootstrap mode
//! draws a resampled center and adds one randomly drawn deviation
//! `x_j − center`, so the distribution carries both the location uncertainty
//! and the spread of the data. With weights, `j` is drawn in proportion to
//! its weight.

use crate::{
    asymptotic,
    intervals::{IntervalRequest, IntervalTarget},
    Bootstrap, ConfidenceInterval, IntervalSummary,
};
use rand::distributions::WeightedIndex;
use rand::Rng;
use statbench_core::{validation, DatasetView, Error, ResultTable, Result};
use statbench_estimators::Statistic;
use tracing::{debug, instrument};

/// Mean-centred and median-centred prediction intervals
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSummary {
    pub mean_based: ConfidenceInterval,
    pub median_based: ConfidenceInterval,
    labels: [String; 2],
}

impl PredictionSummary {
    pub fn to_table(&self) -> Result<ResultTable> {
        let mut table = ResultTable::new(ConfidenceInterval::TABLE_COLUMNS);
        for (label, pi) in self.labels.iter().zip([&self.mean_based, &self.median_based]) {
            table.push_row(label.clone(), pi.table_values())?;
        }
        Ok(table)
    }
}

fn prediction_interval(
    target: IntervalTarget,
    values: &[f64],
    weights: Option<&[f64]>,
    spread: f64,
    request: &IntervalRequest,
    bootstrap: &Bootstrap,
) -> Result<(String, ConfidenceInterval)> {
    let statistic = target.statistic();
    let center = statistic.estimate(values, weights)?;
    let interval = if request.bootstrap.prediction {
        let n = values.len();
        let future = weights
            .map(WeightedIndex::<f64>::new)
            .transpose()
            .map_err(|e| Error::InvalidInput(format!("prediction weights: {e}")))?;
        let distribution = bootstrap.replicate(center, |rng| {
            let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let resampled: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
            let resampled_center = match weights {
                Some(w) => {
                    let resampled_weights: Vec<f64> = indices.iter().map(|&i| w[i]).collect();
                    statistic.estimate(&resampled, Some(&resampled_weights))?
                }
                None => statistic.estimate(&resampled, None)?,
            };
            let j = match &future {
                Some(index) => rng.sample(index),
                None => rng.gen_range(0..n),
            };
            Ok(resampled_center + (values[j] - center))
        })?;
        bootstrap.interval_from(&distribution, center, request.level)?
    } else {
        let n = values.len() as f64;
        asymptotic::t_interval(center, spread * (1.0 + 1.0 / n).sqrt(), n - 1.0, request.level)?
    };
    let family = match target {
        IntervalTarget::Mean(_) => "Mean-based",
        _ => "Median-based",
    };
    let label = format!("{family} PI ({}, {})", statistic.name(), interval.method);
    Ok((label, interval))
}

/// Prediction intervals centred on the chosen mean and median estimators
///
/// Needs at least two observations. Uses `request.bootstrap.prediction` to
/// choose between the analytic and the bootstrap construction.
#[instrument(skip(values, weights, request), fields(n = values.len()))]
pub fn prediction_intervals(
    values: &[f64],
    weights: Option<&[f64]>,
    request: &IntervalRequest,
) -> Result<PredictionSummary> {
    request.validate()?;
    request.check_weights(weights, values.len())?;
    if values.len() < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: values.len(),
        });
    }
    let bootstrap = request.bootstrap()?;
    let spread = request.deviation.estimate(values, weights)?;
    debug!(spread, bootstrap = request.bootstrap.prediction, "prediction spread");

    let (mean_label, mean_based) = prediction_interval(
        IntervalTarget::Mean(request.mean),
        values,
        weights,
        spread,
        request,
        &bootstrap,
    )?;
    let (median_label, median_based) = prediction_interval(
        IntervalTarget::Median(request.median),
        values,
        weights,
        spread,
        request,
        &bootstrap,
    )?;
    Ok(PredictionSummary {
        mean_based,
        median_based,
        labels: [mean_label, median_label],
    })
}

/// Confidence and prediction intervals of one column in a single table
pub fn interval_report<D: DatasetView + ?Sized>(
    dataset: &D,
    column: &str,
    weights_column: Option<&str>,
    request: &IntervalRequest,
) -> Result<(IntervalSummary, PredictionSummary, ResultTable)> {
    let (values, weights) = match weights_column {
        Some(weights_column) => {
            let sample = validation::weighted_sample(dataset, column, weights_column)?;
            (sample.values().to_vec(), Some(sample.weights().to_vec()))
        }
        None => (validation::numeric_sample(dataset, column)?.into_values(), None),
    };
    let confidence = crate::confidence_intervals(&values, weights.as_deref(), request)?;
    let prediction = prediction_intervals(&values, weights.as_deref(), request)?;
    let table = confidence.to_table()?.concat(prediction.to_table()?)?;
    Ok((confidence, prediction, table))
}
