//! Companion plots for the hypothesis tests

use crate::TestOptions;
use statbench_confidence::{Bootstrap, BootstrapDistribution};
use statbench_core::{BoxSummary, Figure, Histogram, Layer, LineStyle, Result};
use statbench_estimators::{DeviationEstimator, MeanEstimator, Statistic};

/// Bootstrap distribution of `statistic` for the `index`-th group of a plot
///
/// Each group gets a disjoint range of per-resample seeds so that two groups
/// never share resampling indices.
fn group_distribution(
    values: &[f64],
    statistic: &dyn Statistic,
    index: u64,
    options: &TestOptions,
) -> Result<BootstrapDistribution> {
    let offset = index.wrapping_mul(options.bootstrap_samples as u64);
    Bootstrap::new(options.bootstrap_samples)?
        .with_optional_seed(options.seed.map(|seed| seed.wrapping_add(offset)))
        .distribution(values, None, statistic)
}

fn density_layer(label: String, data: &[f64]) -> Result<Layer> {
    Ok(Layer::Histogram {
        label,
        histogram: Histogram::freedman_diaconis(data)?,
        density: true,
    })
}

pub(crate) fn one_sample_figure(column: &str, data: &[f64], mean: f64, mu0: f64, options: &TestOptions) -> Result<Figure> {
    let distribution = group_distribution(data, &MeanEstimator::SampleMean, 0, options)?;
    let mut figure = Figure::new(format!("Bootstrap distribution of the mean of {column}"))
        .with_axes(format!("Mean of {column}"), "Density");
    figure.push(density_layer("Bootstrap means".to_string(), distribution.sorted_estimates())?);
    figure.push(Layer::VerticalLine {
        label: "μ₀".to_string(),
        x: mu0,
        style: LineStyle::Dashed,
    });
    figure.push(Layer::VerticalLine {
        label: "Sample mean".to_string(),
        x: mean,
        style: LineStyle::Solid,
    });
    Ok(figure)
}

pub(crate) fn sample_histogram_figure(column: &str, groups: [(&str, &[f64]); 2]) -> Result<Figure> {
    let mut figure = Figure::new(format!("Distribution of {column} by group")).with_axes(column, "Density");
    for (name, data) in groups {
        figure.push(density_layer(name.to_string(), data)?);
    }
    Ok(figure)
}

pub(crate) fn mean_density_figure(column: &str, groups: [(&str, &[f64]); 2], options: &TestOptions) -> Result<Figure> {
    let mut figure = Figure::new(format!("Bootstrap distribution of the mean of {column}"))
        .with_axes(format!("Mean of {column}"), "Density");
    for (index, (name, data)) in groups.into_iter().enumerate() {
        let distribution = group_distribution(data, &MeanEstimator::SampleMean, index as u64, options)?;
        figure.push(density_layer(format!("{name} bootstrap means"), distribution.sorted_estimates())?);
        figure.push(Layer::VerticalLine {
            label: format!("{name} mean"),
            x: statbench_core::math::mean(data),
            style: LineStyle::Dashed,
        });
    }
    Ok(figure)
}

pub(crate) fn deviation_figure(groups: [(&str, &[f64]); 2], options: &TestOptions) -> Result<Figure> {
    let estimator = DeviationEstimator::StandardDeviation { ddof: 1 };
    let mut figure = Figure::new("Bootstrap distribution of the standard deviation")
        .with_axes("Standard deviation", "Density");
    for (index, (name, data)) in groups.into_iter().enumerate() {
        let distribution = group_distribution(data, &estimator, index as u64, options)?;
        figure.push(density_layer(format!("{name} bootstrap standard deviations"), distribution.sorted_estimates())?);
    }
    Ok(figure)
}

pub(crate) fn box_plot_figure(column: &str, factor: &str, groups: &[(String, Vec<f64>)]) -> Result<Figure> {
    let mut figure = Figure::new(format!("{column} by {factor}")).with_axes(factor, column);
    for (name, data) in groups {
        figure.push(Layer::BoxPlot {
            label: name.clone(),
            summary: BoxSummary::from_data(data)?,
        });
    }
    Ok(figure)
}
