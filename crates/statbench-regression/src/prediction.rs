//! Predictions with mean and observation intervals

use serde::Serialize;
use statbench_core::{ResultTable, Result};

/// Column order of [`PredictionFrame::to_table`]
pub const PREDICTION_COLUMNS: [&str; 7] = [
    "mean",
    "mean_se",
    "mean_ci_lower",
    "mean_ci_upper",
    "obs_ci_lower",
    "obs_ci_upper",
    "extrapolated",
];

/// One row per prediction point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionFrame {
    pub mean: Vec<f64>,
    pub mean_se: Vec<f64>,
    pub mean_ci_lower: Vec<f64>,
    pub mean_ci_upper: Vec<f64>,
    pub obs_ci_lower: Vec<f64>,
    pub obs_ci_upper: Vec<f64>,
    /// Whether the point lies outside the covariate range seen in the fit
    pub extrapolated: Vec<bool>,
}

impl PredictionFrame {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            mean: Vec::with_capacity(n),
            mean_se: Vec::with_capacity(n),
            mean_ci_lower: Vec::with_capacity(n),
            mean_ci_upper: Vec::with_capacity(n),
            obs_ci_lower: Vec::with_capacity(n),
            obs_ci_upper: Vec::with_capacity(n),
            extrapolated: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Half-width of the observation interval at each point
    pub fn obs_half_widths(&self) -> Vec<f64> {
        self.obs_ci_upper
            .iter()
            .zip(&self.mean)
            .map(|(upper, mean)| upper - mean)
            .collect()
    }

    pub fn any_extrapolated(&self) -> bool {
        self.extrapolated.iter().any(|&e| e)
    }

    /// Rows labelled by position; the flag is stored as 1.0 or 0.0
    pub fn to_table(&self) -> Result<ResultTable> {
        let mut table = ResultTable::new(PREDICTION_COLUMNS);
        for i in 0..self.len() {
            table.push_row(
                i.to_string(),
                vec![
                    self.mean[i],
                    self.mean_se[i],
                    self.mean_ci_lower[i],
                    self.mean_ci_upper[i],
                    self.obs_ci_lower[i],
                    self.obs_ci_upper[i],
                    if self.extrapolated[i] { 1.0 } else { 0.0 },
                ],
            )?;
        }
        Ok(table)
    }
}
