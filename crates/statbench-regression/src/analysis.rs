//! End-to-end regression over dataset columns

use crate::design::{Design, ModelSpec};
use crate::formula::{ColumnMap, Formula};
use crate::ols::OlsFit;
use crate::plots::{self, SimpleRegressionPlot};
use crate::prediction::PredictionFrame;
use serde::{Deserialize, Serialize};
use statbench_core::{math, validation, ConfidenceLevel, DatasetView, Error, Figure, ResultTable, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Points in a user-specified prediction range
pub const GRID_POINTS: usize = 100;

/// Which diagnostic figure to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionPlot {
    /// Fitted line with bands over one predictor
    #[default]
    SimpleRegression,
    ObservedVsPredicted,
}

impl RegressionPlot {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SimpleRegression => "Simple Regression",
            Self::ObservedVsPredicted => "Observed vs Predicted",
        }
    }
}

impl fmt::Display for RegressionPlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RegressionPlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Simple Regression" => Ok(Self::SimpleRegression),
            "Observed vs Predicted" => Ok(Self::ObservedVsPredicted),
            other => Err(Error::InvalidConfiguration(format!("unknown graph type '{other}'"))),
        }
    }
}

/// Where the single-predictor figure evaluates the model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "grid", rename_all = "snake_case")]
pub enum PredictionGrid {
    /// The observed covariate values, sorted
    #[default]
    Observed,
    /// [`GRID_POINTS`] evenly spaced points over `[min, max]`
    Range { min: f64, max: f64 },
}

impl PredictionGrid {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Observed => Ok(()),
            Self::Range { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(Error::InvalidParameter(format!(
                        "prediction range ({min}, {max}) must be finite"
                    )));
                }
                validation::validate_range(min, max, "prediction range")
            }
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    #[serde(default)]
    pub kind: RegressionPlot,
    #[serde(default = "default_true")]
    pub show_ci: bool,
    #[serde(default = "default_true")]
    pub show_pi: bool,
    #[serde(default)]
    pub grid: PredictionGrid,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            kind: RegressionPlot::default(),
            show_ci: true,
            show_pi: true,
            grid: PredictionGrid::default(),
        }
    }
}

impl PlotOptions {
    pub fn observed_vs_predicted() -> Self {
        Self {
            kind: RegressionPlot::ObservedVsPredicted,
            ..Self::default()
        }
    }

    pub fn with_grid(mut self, grid: PredictionGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_bands(mut self, show_ci: bool, show_pi: bool) -> Self {
        self.show_ci = show_ci;
        self.show_pi = show_pi;
        self
    }
}

/// Columns, model and output options of one regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionRequest {
    pub dependent: String,
    pub independents: Vec<String>,
    /// Ignored in formula mode, where the formula decides
    #[serde(default = "default_true")]
    pub intercept: bool,
    #[serde(default)]
    pub formula: Option<String>,
    /// Figure title shown instead of the default, e.g. a typeset formula
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub level: ConfidenceLevel,
    #[serde(default)]
    pub plot: Option<PlotOptions>,
}

impl RegressionRequest {
    pub fn new<S: Into<String>>(dependent: impl Into<String>, independents: impl IntoIterator<Item = S>) -> Self {
        Self {
            dependent: dependent.into(),
            independents: independents.into_iter().map(Into::into).collect(),
            intercept: true,
            formula: None,
            title: None,
            level: ConfidenceLevel::default(),
            plot: None,
        }
    }

    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.intercept = intercept;
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_level(mut self, level: ConfidenceLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_plot(mut self, plot: PlotOptions) -> Self {
        self.plot = Some(plot);
        self
    }

    /// Checks that need no data
    pub fn validate(&self) -> Result<()> {
        if self.dependent.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "a dependent variable must be chosen".to_string(),
            ));
        }
        if self.independents.is_empty() {
            return Err(Error::InvalidConfiguration(
                "at least one independent variable must be chosen".to_string(),
            ));
        }
        if matches!(&self.formula, Some(text) if text.trim().is_empty()) {
            return Err(Error::InvalidConfiguration(
                "formula mode is enabled but the formula is empty".to_string(),
            ));
        }
        if let Some(plot) = &self.plot {
            if plot.kind == RegressionPlot::SimpleRegression && self.independents.len() != 1 {
                return Err(Error::InvalidConfiguration(format!(
                    "Simple Regression needs exactly one independent variable, got {}",
                    self.independents.len()
                )));
            }
            plot.grid.validate()?;
        }
        Ok(())
    }

    /// Dependent then independents, each once
    fn selected_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::with_capacity(self.independents.len() + 1);
        for column in std::iter::once(&self.dependent).chain(&self.independents) {
            if !columns.contains(&column.as_str()) {
                columns.push(column.as_str());
            }
        }
        columns
    }
}

/// Model evaluated along a grid of the single predictor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPrediction {
    pub x: Vec<f64>,
    pub frame: PredictionFrame,
}

/// Everything one regression run produces
#[derive(Debug, Clone)]
pub struct RegressionReport {
    pub fit: OlsFit,
    pub coefficients: ResultTable,
    pub summary: ResultTable,
    pub summary_text: String,
    /// In-sample predictions, one row per observation used in the fit
    pub fitted: PredictionFrame,
    pub grid: Option<GridPrediction>,
    pub figure: Option<Figure>,
}

/// Selected columns with every incomplete row removed
fn complete_rows<D: DatasetView + ?Sized>(dataset: &D, columns: &[&str]) -> Result<(ColumnMap, usize)> {
    validation::require_columns(dataset, columns)?;
    let raw: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| dataset.numeric_column(c))
        .collect::<Result<_>>()?;
    let keep: Vec<usize> = (0..dataset.n_rows())
        .filter(|&i| raw.iter().all(|col| col[i].is_some_and(f64::is_finite)))
        .collect();
    if keep.is_empty() {
        return Err(Error::EmptyAfterFiltering(format!(
            "no rows without missing values in {}",
            columns.join(", ")
        )));
    }
    let dropped = dataset.n_rows() - keep.len();
    if dropped > 0 {
        warn!(dropped, "rows with missing values removed before fitting");
    }
    let data = columns
        .iter()
        .zip(raw)
        .map(|(name, col)| (name.to_string(), keep.iter().filter_map(|&i| col[i]).collect()))
        .collect();
    Ok((data, keep.len()))
}

fn model_spec(request: &RegressionRequest, columns: &[&str]) -> Result<ModelSpec> {
    match &request.formula {
        Some(text) => {
            let formula = Formula::parse(text)?;
            if let Some(outside) = formula.columns().into_iter().find(|c| !columns.contains(&c.as_str())) {
                return Err(Error::ColumnNotFound(outside));
            }
            Ok(ModelSpec::Formula(formula))
        }
        None => Ok(ModelSpec::Explicit {
            response: request.dependent.clone(),
            predictors: request.independents.clone(),
            intercept: request.intercept,
        }),
    }
}

fn grid_prediction(
    spec: &ModelSpec,
    fit: &OlsFit,
    predictor: &str,
    data_x: &[f64],
    grid: PredictionGrid,
    level: ConfidenceLevel,
) -> Result<GridPrediction> {
    let x = match grid {
        PredictionGrid::Observed => math::sorted(data_x),
        PredictionGrid::Range { min, max } => math::linspace(min, max, GRID_POINTS),
    };
    let mut grid_data = ColumnMap::new();
    grid_data.insert(predictor.to_string(), x.clone());
    let design = spec.design(&grid_data, x.len())?;
    let mut frame = fit.predict(&design, level)?;

    let sorted = math::sorted(data_x);
    if let (Some(&lo), Some(&hi)) = (sorted.first(), sorted.last()) {
        frame.extrapolated = x.iter().map(|&v| v < lo || v > hi).collect();
    }
    if frame.any_extrapolated() {
        warn!(predictor, "prediction grid extends beyond the observed covariate range");
    }
    Ok(GridPrediction { x, frame })
}

/// Fit an OLS model to dataset columns and build its tables and figure
///
/// All request checks run before any column is read. Rows with a missing
/// value in the dependent or any independent column are dropped. In formula
/// mode the formula may only reference those columns, and it alone decides
/// the intercept.
///
/// # Example
///
/// ```rust
/// use statbench_core::Dataset;
/// use statbench_regression::{run_linear_regression, PlotOptions, RegressionRequest};
///
/// let dataset = Dataset::new()
///     .with_numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])
///     .unwrap()
///     .with_numeric("y", vec![3.1, 4.9, 7.2, 8.8, 11.1])
///     .unwrap();
/// let request = RegressionRequest::new("y", ["x"]).with_plot(PlotOptions::default());
/// let report = run_linear_regression(&dataset, &request).unwrap();
/// assert!(report.fit.summary.r_squared > 0.99);
/// assert!(report.figure.is_some());
/// ```
#[instrument(skip(dataset, request), fields(dependent = %request.dependent))]
pub fn run_linear_regression<D: DatasetView + ?Sized>(
    dataset: &D,
    request: &RegressionRequest,
) -> Result<RegressionReport> {
    request.validate()?;
    let columns = request.selected_columns();
    let spec = model_spec(request, &columns)?;
    let (data, n) = complete_rows(dataset, &columns)?;

    let design = Design::build(&spec, &data, n)?;
    let fit = OlsFit::fit(&design, spec.response_label())?;
    let level = request.level;
    let fitted = fit.predict(&design.x, level)?;

    let mut grid = None;
    let figure = match request.plot {
        None => None,
        Some(options) if options.kind == RegressionPlot::ObservedVsPredicted => Some(
            plots::observed_vs_predicted_figure(spec.response_label(), &fit.observed, &fitted, fit.summary.r_squared),
        ),
        Some(options) => {
            let predictor = request.independents[0].as_str();
            let column = data
                .get(predictor)
                .ok_or_else(|| Error::ColumnNotFound(predictor.to_string()))?;
            let data_x: Vec<f64> = design.rows.iter().map(|&i| column[i]).collect();
            let prediction = grid_prediction(&spec, &fit, predictor, &data_x, options.grid, level)?;
            let title = request.title.clone().unwrap_or_else(|| match &spec {
                ModelSpec::Formula(formula) => formula.source().to_string(),
                ModelSpec::Explicit { .. } => {
                    format!("Linear Regression: {} ~ {predictor}", request.dependent)
                }
            });
            let figure = plots::simple_regression_figure(&SimpleRegressionPlot {
                title,
                x_name: predictor,
                y_name: spec.response_label(),
                data_x: &data_x,
                data_y: &fit.observed,
                grid: &prediction.x,
                frame: &prediction.frame,
                show_ci: options.show_ci,
                show_pi: options.show_pi,
                r_squared: fit.summary.r_squared,
            });
            grid = Some(prediction);
            Some(figure)
        }
    };

    info!(
        n_obs = fit.summary.n_obs,
        r_squared = fit.summary.r_squared,
        "linear regression complete"
    );
    Ok(RegressionReport {
        coefficients: fit.coefficient_table(level)?,
        summary: fit.summary.to_table()?,
        summary_text: fit.summary_text(level)?,
        fitted,
        grid,
        figure,
        fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use statbench_core::{Dataset, Layer};

    fn dataset() -> Dataset {
        Dataset::new()
            .with_optional_numeric(
                "x",
                vec![Some(1.0), Some(2.0), Some(3.0), None, Some(5.0), Some(6.0), Some(7.0)],
            )
            .unwrap()
            .with_optional_numeric(
                "y",
                vec![Some(3.2), Some(4.8), Some(7.1), Some(9.0), None, Some(13.2), Some(14.9)],
            )
            .unwrap()
            .with_numeric("z", vec![0.5, 0.1, 0.9, 0.3, 0.7, 0.2, 0.4])
            .unwrap()
            .with_categorical("g", vec!["a", "b", "a", "b", "a", "b", "a"])
            .unwrap()
    }

    #[test]
    fn test_listwise_deletion() {
        let report = run_linear_regression(&dataset(), &RegressionRequest::new("y", ["x"])).unwrap();
        assert_eq!(report.fit.summary.n_obs, 5);
        assert_eq!(report.fitted.len(), 5);
        assert_eq!(report.fit.names, vec!["const", "x"]);
        assert!(report.figure.is_none());
        assert_eq!(report.summary.get("No. Observations", "Value"), Some(5.0));
    }

    #[test]
    fn test_formula_overrides_intercept_flag() {
        let request = RegressionRequest::new("y", ["x", "z"])
            .with_intercept(false)
            .with_formula("y ~ x + I(z ** 2)");
        let report = run_linear_regression(&dataset(), &request).unwrap();
        assert_eq!(report.fit.names, vec!["Intercept", "x", "I(z ** 2)"]);
        assert!(report.coefficients.row("Intercept").is_some());
    }

    #[test]
    fn test_formula_outside_selection() {
        let request = RegressionRequest::new("y", ["x"]).with_formula("y ~ x + z");
        assert!(matches!(
            run_linear_regression(&dataset(), &request),
            Err(Error::ColumnNotFound(name)) if name == "z"
        ));
    }

    #[test]
    fn test_simple_regression_over_range() {
        let request = RegressionRequest::new("y", ["x"]).with_plot(
            PlotOptions::default().with_grid(PredictionGrid::Range { min: -2.0, max: 10.0 }),
        );
        let report = run_linear_regression(&dataset(), &request).unwrap();
        let grid = report.grid.unwrap();
        assert_eq!(grid.x.len(), GRID_POINTS);
        assert!(grid.frame.extrapolated[0]);
        assert!(grid.frame.extrapolated[GRID_POINTS - 1]);
        assert!(grid.frame.extrapolated.iter().any(|e| !e));

        let figure = report.figure.unwrap();
        assert_eq!(figure.title, "Linear Regression: y ~ x");
        let spans: Vec<(f64, f64)> = figure
            .layers()
            .iter()
            .filter_map(|l| match l {
                Layer::VerticalSpan { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(spans, vec![(-2.0, 1.0), (7.0, 10.0)]);
        assert!(figure.annotations[0].text.starts_with("R² = "));
    }

    #[test]
    fn test_simple_regression_on_observed_values() {
        let request = RegressionRequest::new("y", ["x"])
            .with_plot(PlotOptions::default().with_bands(false, true));
        let report = run_linear_regression(&dataset(), &request).unwrap();
        let grid = report.grid.unwrap();
        assert_eq!(grid.x, vec![1.0, 2.0, 3.0, 6.0, 7.0]);
        assert!(!grid.frame.any_extrapolated());
        let figure = report.figure.unwrap();
        let bands = figure.layers().iter().filter(|l| matches!(l, Layer::Band { .. })).count();
        assert_eq!(bands, 1);
        assert!(!figure.layers().iter().any(|l| matches!(l, Layer::VerticalSpan { .. })));
    }

    #[test]
    fn test_observed_vs_predicted() {
        let request = RegressionRequest::new("y", ["x", "z"]).with_plot(PlotOptions::observed_vs_predicted());
        let report = run_linear_regression(&dataset(), &request).unwrap();
        let figure = report.figure.unwrap();
        assert_eq!(figure.x_label, "Observed y");
        let (lo, hi) = figure.x_limits.unwrap();
        let min = report.fit.observed.iter().chain(&report.fitted.mean).cloned().fold(f64::INFINITY, f64::min);
        let max = report.fit.observed.iter().chain(&report.fitted.mean).cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(lo, min - 0.05 * (max - min), epsilon = 1e-12);
        assert_relative_eq!(hi, max + 0.05 * (max - min), epsilon = 1e-12);
        match &figure.layers()[1] {
            Layer::ErrorBars { half_widths, .. } => assert!(half_widths.iter().all(|w| *w > 0.0)),
            other => panic!("unexpected layer {other:?}"),
        }
    }

    #[test]
    fn test_request_errors() {
        let ds = dataset();
        let cases = [
            RegressionRequest::new("", ["x"]),
            RegressionRequest::new("y", Vec::<String>::new()),
            RegressionRequest::new("y", ["x"]).with_formula("  "),
            RegressionRequest::new("y", ["x", "z"]).with_plot(PlotOptions::default()),
        ];
        for request in cases {
            assert!(matches!(
                run_linear_regression(&ds, &request),
                Err(Error::InvalidConfiguration(_))
            ));
        }
        assert!(matches!(
            run_linear_regression(&ds, &RegressionRequest::new("nope", ["x"])),
            Err(Error::ColumnNotFound(_))
        ));
        assert!(matches!(
            run_linear_regression(&ds, &RegressionRequest::new("y", ["g"])),
            Err(Error::NonNumericColumn(_))
        ));
        let bad_range = RegressionRequest::new("y", ["x"])
            .with_plot(PlotOptions::default().with_grid(PredictionGrid::Range { min: 3.0, max: 1.0 }));
        assert!(matches!(
            run_linear_regression(&ds, &bad_range),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            "Residual Plot".parse::<RegressionPlot>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_all_rows_missing() {
        let ds = Dataset::new()
            .with_optional_numeric("x", vec![Some(1.0), None])
            .unwrap()
            .with_optional_numeric("y", vec![None, Some(2.0)])
            .unwrap();
        assert!(matches!(
            run_linear_regression(&ds, &RegressionRequest::new("y", ["x"])),
            Err(Error::EmptyAfterFiltering(_))
        ));
    }
}
