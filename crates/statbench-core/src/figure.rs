//! Renderable figure objects
//!
//! Diagnostic plots are returned as data, not files. A [`Figure`] is a list of
//! typed layers over shared axes that any plotting backend can draw; it
//! serialises to JSON for front ends that render in the browser.

use crate::{math, Error, Result};
use serde::Serialize;

/// A single bin in a histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Left edge of the bin (inclusive)
    pub left: f64,
    /// Right edge of the bin (exclusive, except for the last bin)
    pub right: f64,
    pub count: usize,
    /// count / (total_count * bin_width)
    pub density: f64,
}

impl HistogramBin {
    pub fn new(left: f64, right: f64, count: usize, total_count: usize) -> Self {
        let width = right - left;
        let density = if width > 0.0 && total_count > 0 {
            count as f64 / (total_count as f64 * width)
        } else {
            0.0
        };
        Self {
            left,
            right,
            count,
            density,
        }
    }

    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// Fixed-width histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub total_count: usize,
}

impl Histogram {
    /// Histogram with `num_bins` equal-width bins over `[min, max]`
    pub fn fixed_width(data: &[f64], num_bins: usize) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::empty_input("histogram"));
        }
        let num_bins = num_bins.max(1);
        let sorted = math::sorted(data);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        // Degenerate data still gets a bin of unit width around the value
        let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
        let width = (max - min) / num_bins as f64;

        let mut counts = vec![0usize; num_bins];
        for &x in &sorted {
            let idx = (((x - min) / width) as usize).min(num_bins - 1);
            counts[idx] += 1;
        }
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let left = min + width * i as f64;
                let right = if i == num_bins - 1 { max } else { left + width };
                HistogramBin::new(left, right, count, sorted.len())
            })
            .collect();
        Ok(Self {
            bins,
            total_count: sorted.len(),
        })
    }

    /// Freedman-Diaconis rule: bin width `2 IQR n^(-1/3)`
    pub fn freedman_diaconis(data: &[f64]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::empty_input("histogram"));
        }
        let sorted = math::sorted(data);
        let iqr = math::quantile_sorted(&sorted, 0.75)? - math::quantile_sorted(&sorted, 0.25)?;
        let range = sorted[sorted.len() - 1] - sorted[0];
        let bin_width = 2.0 * iqr * (sorted.len() as f64).powf(-1.0 / 3.0);
        let num_bins = if bin_width > 1e-10 {
            ((range / bin_width).ceil() as usize).clamp(1, 200)
        } else {
            1
        };
        Self::fixed_width(&sorted, num_bins)
    }
}

/// Five-number summary drawn as a box plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    pub fn from_data(data: &[f64]) -> Result<Self> {
        let sorted = math::sorted(data);
        Ok(Self {
            min: math::quantile_sorted(&sorted, 0.0)?,
            q1: math::quantile_sorted(&sorted, 0.25)?,
            median: math::quantile_sorted(&sorted, 0.5)?,
            q3: math::quantile_sorted(&sorted, 0.75)?,
            max: math::quantile_sorted(&sorted, 1.0)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// One drawable element of a figure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    /// Points, optionally coloured by a per-point value
    Scatter {
        label: String,
        x: Vec<f64>,
        y: Vec<f64>,
        color_values: Option<Vec<f64>>,
    },
    Line {
        label: String,
        x: Vec<f64>,
        y: Vec<f64>,
        style: LineStyle,
    },
    /// Filled band between two curves
    Band {
        label: String,
        x: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    },
    Histogram {
        label: String,
        histogram: Histogram,
        density: bool,
    },
    VerticalLine {
        label: String,
        x: f64,
        style: LineStyle,
    },
    /// Shaded vertical strip over `[from, to]`
    VerticalSpan {
        label: String,
        from: f64,
        to: f64,
    },
    /// Symmetric vertical error bars centred on each point
    ErrorBars {
        label: String,
        x: Vec<f64>,
        y: Vec<f64>,
        half_widths: Vec<f64>,
    },
    /// Closed outline, first vertex not repeated
    Polygon {
        label: String,
        x: Vec<f64>,
        y: Vec<f64>,
    },
    Rectangle {
        label: String,
        x_range: (f64, f64),
        y_range: (f64, f64),
        style: LineStyle,
    },
    BoxPlot {
        label: String,
        summary: BoxSummary,
    },
}

/// Text placed at data coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Renderable plot description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub layers: Vec<Layer>,
    pub annotations: Vec<Annotation>,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            layers: Vec::new(),
            annotations: Vec::new(),
            x_limits: None,
            y_limits: None,
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_limits(mut self, x: (f64, f64), y: (f64, f64)) -> Self {
        self.x_limits = Some(x);
        self.y_limits = Some(y);
        self
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn annotate(&mut self, text: impl Into<String>, x: f64, y: f64) {
        self.annotations.push(Annotation {
            text: text.into(),
            x,
            y,
        });
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Other(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_width_histogram() {
        let data = [0.0, 0.5, 1.0, 1.5, 2.0];
        let hist = Histogram::fixed_width(&data, 2).unwrap();
        assert_eq!(hist.bins.len(), 2);
        assert_eq!(hist.bins[0].count, 2);
        assert_eq!(hist.bins[1].count, 3);
        let area: f64 = hist
            .bins
            .iter()
            .map(|b| b.density * (b.right - b.left))
            .sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_histogram() {
        let hist = Histogram::freedman_diaconis(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 3);
        assert!(Histogram::freedman_diaconis(&[]).is_err());
    }

    #[test]
    fn test_box_summary() {
        let summary = BoxSummary::from_data(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.max, 5.0);
    }

    #[test]
    fn test_figure_serialises_layers() {
        let mut figure = Figure::new("test").with_axes("x", "y");
        figure.push(Layer::VerticalLine {
            label: "mu0".to_string(),
            x: 1.0,
            style: LineStyle::Dashed,
        });
        let json = figure.to_json().unwrap();
        assert!(json.contains("\"kind\":\"vertical_line\""));
        assert!(json.contains("\"style\":\"dashed\""));
    }
}
