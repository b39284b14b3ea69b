//! Joint confidence regions over (μ, σ)
//!
//! Each region is a likelihood contour of a normal working model centred at
//! the chosen location and scale estimates `(μ̂, σ̂)`. A point `(μ, σ)` lies
//! inside the region at level `L` when its deviance
//!
//! ```text
//! D(μ, σ) = 2n·ln(σ/σ̂) + n(σ̂² + (μ − μ̂)²)/σ² − n
//! ```
//!
//! is at most the `L` quantile of χ² with two degrees of freedom. The
//! threshold grows with `L`, so regions at increasing levels nest.
//!
//! Writing `t = σ/σ̂`, the boundary half-width in μ at a given σ is
//! `σ̂·√h(t)` with `h(t) = t²(c/n + 1 − 2·ln t) − 1`. `h` rises on
//! `(0, e^{c/2n})` and falls afterwards, so the region spans σ between the
//! two roots of `h` and its widest μ extent is `σ̂·√(e^{c/n} − 1)`.

use crate::{
    intervals::{IntervalRequest, IntervalTarget, PreparedInterval},
    ConfidenceInterval,
};
use serde::{Deserialize, Serialize};
use statbench_core::{
    math::distributions, validation, ConfidenceLevel, DatasetView, Error, Figure, Layer, LineStyle,
    ResultTable, Result,
};
use statbench_estimators::Statistic;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Default nested levels
pub const DEFAULT_REGION_LEVELS: [f64; 5] = [0.1, 0.5, 0.75, 0.89, 0.95];

const BISECTION_STEPS: usize = 200;

/// Which location estimator the μ CI box and region centre use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuCiSource {
    #[default]
    MeanBased,
    MedianBased,
}

impl fmt::Display for MuCiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeanBased => write!(f, "Mean-based CI"),
            Self::MedianBased => write!(f, "Median-based CI"),
        }
    }
}

impl FromStr for MuCiSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Mean-based CI" | "mean" => Ok(Self::MeanBased),
            "Median-based CI" | "median" => Ok(Self::MedianBased),
            other => Err(Error::InvalidParameter(format!("unknown μ CI source '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionRequest {
    pub levels: Vec<f64>,
    /// Padding below and above the μ extent
    pub eps_mu: (f64, f64),
    /// Padding below and above the σ extent; the lower bound stays at or above 0
    pub eps_sigma: (f64, f64),
    pub add_ci_box: bool,
    pub mu_ci_source: MuCiSource,
    /// Estimators and bootstrap settings for the centre and CI boxes
    pub intervals: IntervalRequest,
    pub boundary_points: usize,
}

impl Default for RegionRequest {
    fn default() -> Self {
        Self {
            levels: DEFAULT_REGION_LEVELS.to_vec(),
            eps_mu: (0.1, 0.1),
            eps_sigma: (0.05, 0.05),
            add_ci_box: true,
            mu_ci_source: MuCiSource::MeanBased,
            intervals: IntervalRequest::default(),
            boundary_points: 200,
        }
    }
}

impl RegionRequest {
    pub fn with_levels(mut self, levels: Vec<f64>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_margins(mut self, eps_mu: (f64, f64), eps_sigma: (f64, f64)) -> Self {
        self.eps_mu = eps_mu;
        self.eps_sigma = eps_sigma;
        self
    }

    pub fn with_ci_box(mut self, add_ci_box: bool) -> Self {
        self.add_ci_box = add_ci_box;
        self
    }

    pub fn with_mu_ci_source(mut self, source: MuCiSource) -> Self {
        self.mu_ci_source = source;
        self
    }

    pub fn with_intervals(mut self, intervals: IntervalRequest) -> Self {
        self.intervals = intervals;
        self
    }

    /// Levels sorted ascending; each must be in (0, 1) and appear once
    pub fn sorted_levels(&self) -> Result<Vec<ConfidenceLevel>> {
        validation::validate_probabilities(&self.levels)?;
        let mut levels = self.levels.clone();
        levels.sort_by(|a, b| a.total_cmp(b));
        if levels.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::InvalidParameter(
                "confidence region levels must be distinct".to_string(),
            ));
        }
        levels.into_iter().map(ConfidenceLevel::new).collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.sorted_levels()?;
        validation::validate_margin_pair(self.eps_mu, "eps_mu")?;
        validation::validate_margin_pair(self.eps_sigma, "eps_sigma")?;
        if self.boundary_points < 8 {
            return Err(Error::InvalidParameter(format!(
                "boundary_points must be at least 8, got {}",
                self.boundary_points
            )));
        }
        self.intervals.validate()
    }

    fn location_target(&self) -> IntervalTarget {
        match self.mu_ci_source {
            MuCiSource::MeanBased => IntervalTarget::Mean(self.intervals.mean),
            MuCiSource::MedianBased => IntervalTarget::Median(self.intervals.median),
        }
    }
}

/// Point estimate the regions are centred on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionEstimate {
    pub mu: f64,
    pub sigma: f64,
    pub n: usize,
}

impl RegionEstimate {
    /// Deviance of `(mu, sigma)` relative to the estimate
    ///
    /// Infinite for `sigma <= 0` unless the estimate itself is the point
    /// `(mu, 0)`.
    pub fn deviance(&self, mu: f64, sigma: f64) -> f64 {
        let n = self.n as f64;
        if self.sigma == 0.0 {
            return if sigma == 0.0 && mu == self.mu { 0.0 } else { f64::INFINITY };
        }
        if sigma <= 0.0 {
            return f64::INFINITY;
        }
        let dmu = mu - self.mu;
        2.0 * n * (sigma / self.sigma).ln() + n * (self.sigma.powi(2) + dmu * dmu) / (sigma * sigma) - n
    }
}

/// One nested region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceRegion {
    pub level: f64,
    /// χ²₂ quantile bounding the deviance
    pub threshold: f64,
    /// Closed boundary as (μ, σ) vertices; the first vertex is not repeated
    pub boundary: Vec<(f64, f64)>,
    pub mu_range: (f64, f64),
    pub sigma_range: (f64, f64),
    pub padded_mu_range: (f64, f64),
    pub padded_sigma_range: (f64, f64),
    pub mu_ci: Option<ConfidenceInterval>,
    pub sigma_ci: Option<ConfidenceInterval>,
    estimate: RegionEstimate,
}

impl ConfidenceRegion {
    /// Whether `(mu, sigma)` lies inside the contour, margins excluded
    pub fn contains(&self, mu: f64, sigma: f64) -> bool {
        self.estimate.deviance(mu, sigma) <= self.threshold
    }

    /// Area enclosed by the boundary polygon
    pub fn area(&self) -> f64 {
        let n = self.boundary.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let (x0, y0) = self.boundary[i];
                let (x1, y1) = self.boundary[(i + 1) % n];
                x0 * y1 - x1 * y0
            })
            .sum();
        twice.abs() / 2.0
    }
}

/// Regions in ascending level order with their table and figure
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    pub estimate: RegionEstimate,
    pub regions: Vec<ConfidenceRegion>,
    pub table: ResultTable,
    pub figure: Figure,
}

/// Columns of the region table
pub const REGION_COLUMNS: [&str; 10] = [
    "Level",
    "Deviance Threshold",
    "mu min",
    "mu max",
    "sigma min",
    "sigma max",
    "mu CI lower",
    "mu CI upper",
    "sigma CI lower",
    "sigma CI upper",
];

fn h(t: f64, c_over_n: f64) -> f64 {
    if t <= 0.0 {
        return -1.0;
    }
    t * t * (c_over_n + 1.0 - 2.0 * t.ln()) - 1.0
}

/// Root of `h` in `[lo, hi]` where `h(lo)` and `h(hi)` differ in sign
fn bisect(mut lo: f64, mut hi: f64, c_over_n: f64) -> f64 {
    let rising = h(lo, c_over_n) < 0.0;
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if (h(mid, c_over_n) < 0.0) == rising {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= f64::EPSILON * hi.max(1.0) {
            break;
        }
    }
    0.5 * (lo + hi)
}

/// Range of `t = σ/σ̂` covered by the contour
fn sigma_ratio_roots(c_over_n: f64) -> Result<(f64, f64)> {
    let peak = (c_over_n / 2.0).exp();
    let lower = bisect(0.0, 1.0, c_over_n);
    let mut hi = 2.0 * peak;
    while h(hi, c_over_n) >= 0.0 {
        hi *= 2.0;
        if !hi.is_finite() {
            return Err(Error::Computation(
                "confidence region boundary did not close".to_string(),
            ));
        }
    }
    Ok((lower, bisect(peak, hi, c_over_n)))
}

fn build_region(
    estimate: RegionEstimate,
    level: ConfidenceLevel,
    request: &RegionRequest,
) -> Result<ConfidenceRegion> {
    let threshold = distributions::chi_squared_quantile(level.value(), 2.0)?;
    let (mu_hat, sigma_hat) = (estimate.mu, estimate.sigma);

    let (boundary, mu_range, sigma_range) = if sigma_hat == 0.0 {
        (vec![(mu_hat, 0.0)], (mu_hat, mu_hat), (0.0, 0.0))
    } else {
        let c_over_n = threshold / estimate.n as f64;
        let (t_lo, t_hi) = sigma_ratio_roots(c_over_n)?;
        let m = request.boundary_points;
        // Cosine spacing packs vertices near the σ extremes where the
        // boundary turns sharply
        let ts: Vec<f64> = (0..m)
            .map(|k| {
                let u = (1.0 - (PI * k as f64 / (m - 1) as f64).cos()) / 2.0;
                t_lo + (t_hi - t_lo) * u
            })
            .collect();
        let half: Vec<f64> = ts
            .iter()
            .map(|&t| sigma_hat * h(t, c_over_n).max(0.0).sqrt())
            .collect();

        let mut boundary = Vec::with_capacity(2 * m - 2);
        boundary.extend(ts.iter().zip(&half).map(|(&t, &w)| (mu_hat + w, sigma_hat * t)));
        boundary.extend(
            ts.iter()
                .zip(&half)
                .skip(1)
                .take(m - 2)
                .rev()
                .map(|(&t, &w)| (mu_hat - w, sigma_hat * t)),
        );
        let mu_extent = sigma_hat * (c_over_n.exp() - 1.0).sqrt();
        (
            boundary,
            (mu_hat - mu_extent, mu_hat + mu_extent),
            (sigma_hat * t_lo, sigma_hat * t_hi),
        )
    };

    debug!(level = level.value(), threshold, ?mu_range, ?sigma_range, "region extent");
    Ok(ConfidenceRegion {
        level: level.value(),
        threshold,
        boundary,
        mu_range,
        sigma_range,
        padded_mu_range: (mu_range.0 - request.eps_mu.0, mu_range.1 + request.eps_mu.1),
        padded_sigma_range: (
            (sigma_range.0 - request.eps_sigma.0).max(0.0),
            sigma_range.1 + request.eps_sigma.1,
        ),
        mu_ci: None,
        sigma_ci: None,
        estimate,
    })
}

fn region_table(regions: &[ConfidenceRegion]) -> Result<ResultTable> {
    let mut table = ResultTable::new(REGION_COLUMNS);
    for region in regions {
        let (mu_lo, mu_hi) = region.mu_ci.map_or((f64::NAN, f64::NAN), |ci| (ci.lower, ci.upper));
        let (sd_lo, sd_hi) = region
            .sigma_ci
            .map_or((f64::NAN, f64::NAN), |ci| (ci.lower, ci.upper));
        table.push_row(
            format!("Level {}", region.level),
            vec![
                region.level,
                region.threshold,
                region.mu_range.0,
                region.mu_range.1,
                region.sigma_range.0,
                region.sigma_range.1,
                mu_lo,
                mu_hi,
                sd_lo,
                sd_hi,
            ],
        )?;
    }
    Ok(table)
}

fn region_figure(estimate: RegionEstimate, regions: &[ConfidenceRegion], request: &RegionRequest) -> Figure {
    let mut figure = Figure::new("Confidence regions for (μ, σ)").with_axes("μ", "σ");
    // Largest level drawn first so smaller regions stay visible on top
    for region in regions.iter().rev() {
        figure.push(Layer::Polygon {
            label: format!("{} region", region.level),
            x: region.boundary.iter().map(|p| p.0).collect(),
            y: region.boundary.iter().map(|p| p.1).collect(),
        });
        if let (Some(mu_ci), Some(sigma_ci)) = (region.mu_ci, region.sigma_ci) {
            figure.push(Layer::Rectangle {
                label: format!("{} CI box ({})", region.level, request.mu_ci_source),
                x_range: (mu_ci.lower, mu_ci.upper),
                y_range: (sigma_ci.lower, sigma_ci.upper),
                style: LineStyle::Dashed,
            });
        }
    }
    figure.push(Layer::Scatter {
        label: "Estimate".to_string(),
        x: vec![estimate.mu],
        y: vec![estimate.sigma],
        color_values: None,
    });

    if let Some(outer) = regions.last() {
        let mut x = outer.padded_mu_range;
        let mut y = outer.padded_sigma_range;
        for ci in regions.iter().filter_map(|r| r.mu_ci) {
            x = (x.0.min(ci.lower), x.1.max(ci.upper));
        }
        for ci in regions.iter().filter_map(|r| r.sigma_ci) {
            y = (y.0.min(ci.lower).max(0.0), y.1.max(ci.upper));
        }
        if x.0 < x.1 && y.0 < y.1 {
            figure = figure.with_limits(x, y);
        }
    }
    figure
}

/// Nested confidence regions for (μ, σ), one per requested level
///
/// # Example
///
/// ```rust
/// use statbench_confidence::{confidence_regions, RegionRequest};
///
/// let data: Vec<f64> = (0..40).map(|i| (i % 9) as f64 + 0.25 * i as f64).collect();
/// let set = confidence_regions(&data, None, &RegionRequest::default()).unwrap();
/// assert_eq!(set.regions.len(), 5);
/// assert!(set.regions[0].area() <= set.regions[4].area());
/// ```
#[instrument(skip(values, weights, request), fields(n = values.len()))]
pub fn confidence_regions(
    values: &[f64],
    weights: Option<&[f64]>,
    request: &RegionRequest,
) -> Result<RegionSet> {
    request.validate()?;
    let levels = request.sorted_levels()?;
    request.intervals.check_weights(weights, values.len())?;
    if values.len() < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: values.len(),
        });
    }

    let location = request.location_target();
    let estimate = RegionEstimate {
        mu: location.statistic().estimate(values, weights)?,
        sigma: request.intervals.deviation.estimate(values, weights)?,
        n: values.len(),
    };
    debug!(
        mu = estimate.mu,
        sigma = estimate.sigma,
        location = %location.statistic().name(),
        "region centre"
    );

    let boxes = if request.add_ci_box {
        let bootstrap = request.intervals.bootstrap()?;
        let toggles = request.intervals.bootstrap;
        let mu_toggle = match request.mu_ci_source {
            MuCiSource::MeanBased => toggles.mean,
            MuCiSource::MedianBased => toggles.median,
        };
        Some((
            PreparedInterval::prepare(location, values, weights, mu_toggle, &bootstrap)?,
            PreparedInterval::prepare(
                IntervalTarget::Deviation(request.intervals.deviation),
                values,
                weights,
                toggles.deviation,
                &bootstrap,
            )?,
        ))
    } else {
        None
    };

    let mut regions = Vec::with_capacity(levels.len());
    for level in levels {
        let mut region = build_region(estimate, level, request)?;
        if let Some((mu_interval, sigma_interval)) = &boxes {
            region.mu_ci = Some(mu_interval.interval(level)?);
            region.sigma_ci = Some(sigma_interval.interval(level)?);
        }
        regions.push(region);
    }

    let table = region_table(&regions)?;
    let figure = region_figure(estimate, &regions, request);
    Ok(RegionSet {
        estimate,
        regions,
        table,
        figure,
    })
}

/// Regions for one column of a dataset view
pub fn run_confidence_regions<D: DatasetView + ?Sized>(
    dataset: &D,
    column: &str,
    weights_column: Option<&str>,
    request: &RegionRequest,
) -> Result<RegionSet> {
    match weights_column {
        Some(weights_column) => {
            let sample = validation::weighted_sample(dataset, column, weights_column)?;
            confidence_regions(sample.values(), Some(sample.weights()), request)
        }
        None => {
            let sample = validation::numeric_sample(dataset, column)?;
            confidence_regions(sample.values(), None, request)
        }
    }
}
