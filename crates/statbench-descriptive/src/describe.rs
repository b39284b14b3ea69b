//! Summary statistics for one column

use crate::moments;
use serde::{Deserialize, Serialize};
use statbench_core::{math, validation, DatasetView, Error, ResultTable, Result};
use statbench_estimators::{location, scale, DEFAULT_TRIM, DEFAULT_WINSOR_LIMITS};
use tracing::{debug, instrument};

/// Column order of the descriptive table
pub const DESCRIPTIVE_COLUMNS: [&str; 2] = ["Value", "Bias Corrected"];

/// Quantiles reported when the caller does not pick any
pub const DEFAULT_QUANTILES: [f64; 3] = [0.25, 0.5, 0.75];

fn default_trim() -> Option<f64> {
    Some(DEFAULT_TRIM)
}

fn default_winsor() -> Option<(f64, f64)> {
    Some(DEFAULT_WINSOR_LIMITS)
}

fn default_quantiles() -> Vec<f64> {
    DEFAULT_QUANTILES.to_vec()
}

/// Optional rows and their parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveOptions {
    /// Trim fraction per tail; `None` omits the trimmed-mean row
    #[serde(default = "default_trim")]
    pub trim: Option<f64>,
    /// Winsor limits; `None` omits the winsorized-mean row
    #[serde(default = "default_winsor")]
    pub winsor: Option<(f64, f64)>,
    #[serde(default = "default_quantiles")]
    pub quantiles: Vec<f64>,
}

impl Default for DescriptiveOptions {
    fn default() -> Self {
        Self {
            trim: default_trim(),
            winsor: default_winsor(),
            quantiles: default_quantiles(),
        }
    }
}

impl DescriptiveOptions {
    pub fn with_trim(mut self, trim: Option<f64>) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_winsor(mut self, winsor: Option<(f64, f64)>) -> Self {
        self.winsor = winsor;
        self
    }

    pub fn with_quantiles(mut self, quantiles: Vec<f64>) -> Self {
        self.quantiles = quantiles;
        self
    }

    /// Parse a comma-separated probability list such as `"0.1, 0.9"`
    pub fn with_quantiles_text(self, text: &str) -> Result<Self> {
        let quantiles = validation::parse_probabilities(text)?;
        Ok(self.with_quantiles(quantiles))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(alpha) = self.trim {
            location::validate_trim(alpha)?;
        }
        if let Some((lower, upper)) = self.winsor {
            location::validate_winsor_limits(lower, upper)?;
        }
        validation::validate_probabilities(&self.quantiles)
    }
}

/// Label of a quantile row, e.g. `Q(0.25)`
pub fn quantile_label(p: f64) -> String {
    format!("Q({p})")
}

/// Descriptive table of a sample, optionally weighted
///
/// Needs at least two values. Weighted rows are appended when `weights` is
/// given; weights must be non-negative with a positive total.
#[instrument(skip(data, weights, options), fields(n = data.len(), weighted = weights.is_some()))]
pub fn describe_sample(data: &[f64], weights: Option<&[f64]>, options: &DescriptiveOptions) -> Result<ResultTable> {
    options.validate()?;
    if data.len() < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: data.len(),
        });
    }
    if let Some(w) = weights {
        statbench_core::sample::validate_weights(w, data.len())?;
    }

    let n = data.len();
    let nf = n as f64;
    let sorted = math::sorted(data);
    let nan = f64::NAN;
    let mut table = ResultTable::new(DESCRIPTIVE_COLUMNS);

    table.push_row("Count", vec![nf, nan])?;

    let mean = math::mean(data);
    table.push_row("Mean", vec![mean, moments::jackknife(data, mean, |d| Ok(math::mean(d)))?])?;

    if let Some(alpha) = options.trim {
        let value = location::trimmed_mean(data, alpha)?;
        let corrected = moments::jackknife(data, value, |d| location::trimmed_mean(d, alpha))?;
        table.push_row("Trimmed Mean", vec![value, corrected])?;
    }
    if let Some((lower, upper)) = options.winsor {
        let value = location::winsorized_mean(data, lower, upper)?;
        let corrected = moments::jackknife(data, value, |d| location::winsorized_mean(d, lower, upper))?;
        table.push_row("Winsorized Mean", vec![value, corrected])?;
    }

    let median = math::quantile_sorted(&sorted, 0.5)?;
    table.push_row("Median", vec![median, moments::jackknife(data, median, location::median)?])?;

    let variance = math::variance(data, 0)?;
    let unbiased = math::variance(data, 1)?;
    table.push_row("Variance", vec![variance, unbiased])?;
    table.push_row("Std Dev", vec![variance.sqrt(), unbiased.sqrt() / moments::c4(n)?])?;
    table.push_row("SEM", vec![unbiased.sqrt() / nf.sqrt(), nan])?;
    table.push_row(
        "Skewness",
        vec![moments::skewness(data), moments::adjusted_skewness(data)],
    )?;
    table.push_row(
        "Kurtosis",
        vec![moments::excess_kurtosis(data), moments::adjusted_excess_kurtosis(data)],
    )?;

    let min = sorted[0];
    let max = sorted[n - 1];
    table.push_row("Min", vec![min, nan])?;
    table.push_row("Max", vec![max, nan])?;
    table.push_row("Range", vec![max - min, nan])?;
    table.push_row("IQR", vec![scale::iqr(data)?, nan])?;
    for &p in &options.quantiles {
        table.push_row(quantile_label(p), vec![math::quantile_sorted(&sorted, p)?, nan])?;
    }

    if let Some(w) = weights {
        let plug_in = scale::weighted_variance(data, w, false)?;
        let reliability = scale::weighted_variance(data, w, true)?;
        table.push_row("Weighted Mean", vec![location::weighted_mean(data, w)?, nan])?;
        table.push_row("Weighted Median", vec![location::weighted_median(data, w)?, nan])?;
        table.push_row("Weighted Variance", vec![plug_in, reliability])?;
        table.push_row("Weighted Std Dev", vec![plug_in.sqrt(), reliability.sqrt()])?;
    }
    debug!(rows = table.len(), "descriptive statistics");
    Ok(table)
}

/// Descriptive table of a dataset column
///
/// Missing values are dropped; with a weights column, rows are kept where
/// the value is present and the weight must then be present too. A
/// non-numeric or negative weights column is `InvalidInput`.
///
/// # Example
///
/// ```rust
/// use statbench_core::Dataset;
/// use statbench_descriptive::{describe, DescriptiveOptions};
///
/// let dataset = Dataset::new()
///     .with_optional_numeric("x", vec![Some(2.0), None, Some(4.0), Some(9.0)])
///     .unwrap();
/// let table = describe(&dataset, "x", None, &DescriptiveOptions::default()).unwrap();
/// assert_eq!(table.get("Count", "Value"), Some(3.0));
/// assert_eq!(table.get("Median", "Value"), Some(4.0));
/// ```
pub fn describe<D: DatasetView + ?Sized>(
    dataset: &D,
    column: &str,
    weights_column: Option<&str>,
    options: &DescriptiveOptions,
) -> Result<ResultTable> {
    options.validate()?;
    match weights_column {
        Some(weights_column) => {
            let sample = validation::weighted_sample(dataset, column, weights_column)?;
            describe_sample(sample.values(), Some(sample.weights()), options)
        }
        None => {
            let sample = validation::numeric_sample(dataset, column)?;
            describe_sample(sample.values(), None, options)
        }
    }
}
