//! Diagnostic figures for a fitted regression

use crate::prediction::PredictionFrame;
use statbench_core::{Figure, Layer, LineStyle};

fn bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn r_squared_label(r_squared: f64) -> String {
    format!("R² = {r_squared:.3}")
}

/// Inputs of the single-predictor figure
pub(crate) struct SimpleRegressionPlot<'a> {
    pub title: String,
    pub x_name: &'a str,
    pub y_name: &'a str,
    pub data_x: &'a [f64],
    pub data_y: &'a [f64],
    /// Sorted prediction points
    pub grid: &'a [f64],
    pub frame: &'a PredictionFrame,
    pub show_ci: bool,
    pub show_pi: bool,
    pub r_squared: f64,
}

/// Data, fitted line, optional bands and shaded extrapolation strips
pub(crate) fn simple_regression_figure(plot: &SimpleRegressionPlot<'_>) -> Figure {
    let frame = plot.frame;
    let mut figure = Figure::new(plot.title.clone()).with_axes(plot.x_name, plot.y_name);
    figure.push(Layer::Scatter {
        label: "Data".to_string(),
        x: plot.data_x.to_vec(),
        y: plot.data_y.to_vec(),
        color_values: None,
    });
    figure.push(Layer::Line {
        label: "Prediction".to_string(),
        x: plot.grid.to_vec(),
        y: frame.mean.clone(),
        style: LineStyle::Solid,
    });
    if plot.show_ci {
        figure.push(Layer::Band {
            label: "Confidence Interval (mean)".to_string(),
            x: plot.grid.to_vec(),
            lower: frame.mean_ci_lower.clone(),
            upper: frame.mean_ci_upper.clone(),
        });
    }
    if plot.show_pi {
        figure.push(Layer::Band {
            label: "Prediction Interval (new obs)".to_string(),
            x: plot.grid.to_vec(),
            lower: frame.obs_ci_lower.clone(),
            upper: frame.obs_ci_upper.clone(),
        });
    }

    let (x_min, x_max) = bounds(plot.data_x.iter().copied());
    if let (Some(&first), Some(&last)) = (plot.grid.first(), plot.grid.last()) {
        if first < x_min {
            figure.push(Layer::VerticalSpan {
                label: "Extrapolation".to_string(),
                from: first,
                to: x_min,
            });
        }
        if last > x_max {
            figure.push(Layer::VerticalSpan {
                label: "Extrapolation".to_string(),
                from: x_max,
                to: last,
            });
        }
    }

    let (grid_lo, grid_hi) = bounds(plot.grid.iter().chain(plot.data_x).copied());
    let upper = if plot.show_pi { &frame.obs_ci_upper } else { &frame.mean };
    let (y_lo, y_hi) = bounds(plot.data_y.iter().chain(upper).copied());
    figure.annotate(
        r_squared_label(plot.r_squared),
        grid_lo + 0.05 * (grid_hi - grid_lo),
        y_hi - 0.05 * (y_hi - y_lo),
    );
    figure
}

/// Observed against fitted values with prediction-interval error bars
///
/// Points are coloured by absolute residual. Both axes share limits padded
/// by 5% of the data span so the 45° line runs corner to corner.
pub(crate) fn observed_vs_predicted_figure(
    y_name: &str,
    observed: &[f64],
    frame: &PredictionFrame,
    r_squared: f64,
) -> Figure {
    let residuals: Vec<f64> = observed
        .iter()
        .zip(&frame.mean)
        .map(|(y, y_hat)| (y - y_hat).abs())
        .collect();
    let (lo, hi) = bounds(observed.iter().chain(&frame.mean).copied());
    let pad = 0.05 * (hi - lo);

    let mut figure = Figure::new("Observed vs Predicted")
        .with_axes(format!("Observed {y_name}"), format!("Predicted {y_name}"))
        .with_limits((lo - pad, hi + pad), (lo - pad, hi + pad));
    figure.push(Layer::Scatter {
        label: "Predictions".to_string(),
        x: observed.to_vec(),
        y: frame.mean.clone(),
        color_values: Some(residuals),
    });
    figure.push(Layer::ErrorBars {
        label: "Prediction Interval".to_string(),
        x: observed.to_vec(),
        y: frame.mean.clone(),
        half_widths: frame.obs_half_widths(),
    });
    figure.push(Layer::Line {
        label: "Perfect Fit".to_string(),
        x: vec![lo, hi],
        y: vec![lo, hi],
        style: LineStyle::Dashed,
    });
    figure.annotate(r_squared_label(r_squared), lo + pad, hi - pad);
    figure
}
