//! Ordinary least squares regression over dataset columns
//!
//! Models are specified either explicitly, as a dependent column regressed on
//! independent columns with an optional `const` intercept, or by a symbolic
//! [`Formula`] such as `np.log(y) ~ x * z - 1` that supports transformations,
//! interactions and its own intercept control.
//!
//! A fit yields the coefficient table, a goodness-of-fit summary in table and
//! plain-text form, and a [`PredictionFrame`] of mean and observation
//! intervals. Two diagnostic figures are available: the fitted line over a
//! single predictor with extrapolated ranges shaded, and observed against
//! predicted values.

mod analysis;
mod design;
mod formula;
mod ols;
mod plots;
mod prediction;

pub use analysis::{
    run_linear_regression, GridPrediction, PlotOptions, PredictionGrid, RegressionPlot,
    RegressionReport, RegressionRequest, GRID_POINTS,
};
pub use design::{Design, ModelSpec, EXPLICIT_INTERCEPT};
pub use formula::{BinaryOp, ColumnMap, Expr, Factor, Formula, Function, Term, FORMULA_INTERCEPT};
pub use ols::{coefficient_columns, ModelSummary, OlsFit};
pub use prediction::{PredictionFrame, PREDICTION_COLUMNS};
