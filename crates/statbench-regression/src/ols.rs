//! Ordinary least squares
//!
//! The fit solves the normal equations `(XᵀX) β = Xᵀy` through a Cholesky
//! factorisation after checking the design has full column rank. The inverse
//! `(XᵀX)⁻¹` is kept so that standard errors and prediction intervals at new
//! design rows come from the same factorisation.

use crate::design::Design;
use crate::prediction::PredictionFrame;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statbench_core::{math::distributions, ConfidenceLevel, Error, ResultTable, Result};
use std::f64::consts::PI;
use std::fmt;
use tracing::{debug, instrument};

/// Goodness-of-fit statistics of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub n_obs: usize,
    /// Regressors excluding the intercept
    pub df_model: f64,
    pub df_resid: f64,
    /// Centred when the model has an intercept, uncentred otherwise
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Residual variance `SSR / df_resid`
    pub scale: f64,
    pub ssr: f64,
}

impl ModelSummary {
    pub const ROWS: [&'static str; 11] = [
        "No. Observations",
        "Df Model",
        "Df Residuals",
        "R-squared",
        "Adj. R-squared",
        "F-statistic",
        "Prob (F-statistic)",
        "Log-Likelihood",
        "AIC",
        "BIC",
        "Scale",
    ];

    fn values(&self) -> [f64; 11] {
        [
            self.n_obs as f64,
            self.df_model,
            self.df_resid,
            self.r_squared,
            self.adj_r_squared,
            self.f_statistic,
            self.f_p_value,
            self.log_likelihood,
            self.aic,
            self.bic,
            self.scale,
        ]
    }

    pub fn to_table(&self) -> Result<ResultTable> {
        let mut table = ResultTable::new(["Value"]);
        for (label, value) in Self::ROWS.iter().zip(self.values()) {
            table.push_row(*label, vec![value])?;
        }
        Ok(table)
    }
}

/// Label for a tail probability in a column header, e.g. `0.025`
///
/// Twelve decimals then trailing zeros trimmed, so `1 - 0.95` prints as
/// `0.05` rather than its binary expansion.
fn probability_label(p: f64) -> String {
    let text = format!("{p:.12}");
    let text = text.trim_end_matches('0');
    text.trim_end_matches('.').to_string()
}

/// Headers of the coefficient table at significance `alpha`
pub fn coefficient_columns(alpha: f64) -> [String; 6] {
    [
        "Coef.".to_string(),
        "Std.Err.".to_string(),
        "t".to_string(),
        "P>|t|".to_string(),
        format!("[{}", probability_label(alpha / 2.0)),
        format!("{}]", probability_label(1.0 - alpha / 2.0)),
    ]
}

/// A fitted least-squares model
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub names: Vec<String>,
    pub response: String,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub observed: Vec<f64>,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub has_intercept: bool,
    pub summary: ModelSummary,
    beta: DVector<f64>,
    /// `(XᵀX)⁻¹`
    normalized_cov: DMatrix<f64>,
}

impl OlsFit {
    /// Fit `design.y` on `design.x`
    ///
    /// Needs more observations than parameters and a design of full column
    /// rank; a rank-deficient design is `InvalidConfiguration`.
    #[instrument(skip(design), fields(n = design.n_obs(), p = design.n_params()))]
    pub fn fit(design: &Design, response: &str) -> Result<Self> {
        let n = design.n_obs();
        let p = design.n_params();
        if n <= p {
            return Err(Error::InsufficientData {
                expected: p + 1,
                actual: n,
            });
        }

        let singular = design.x.clone().svd(false, false).singular_values;
        let largest = singular.iter().cloned().fold(0.0, f64::max);
        let tolerance = largest * n.max(p) as f64 * f64::EPSILON;
        let rank = singular.iter().filter(|&&s| s > tolerance).count();
        if rank < p {
            return Err(Error::InvalidConfiguration(format!(
                "design matrix is rank deficient: rank {rank} for {p} columns"
            )));
        }

        let xt = design.x.transpose();
        let normalized_cov = (&xt * &design.x)
            .cholesky()
            .map(|c| c.inverse())
            .ok_or_else(|| Error::Computation("XᵀX is not positive definite".to_string()))?;
        let beta = &normalized_cov * (&xt * &design.y);

        let fitted_vec = &design.x * &beta;
        let residual_vec = &design.y - &fitted_vec;
        let ssr = residual_vec.norm_squared();

        let k_const = usize::from(design.has_intercept);
        let df_model = (p - k_const) as f64;
        let df_resid = (n - p) as f64;
        let scale = ssr / df_resid;

        let y_mean = design.y.mean();
        let tss = if design.has_intercept {
            design.y.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>()
        } else {
            design.y.norm_squared()
        };
        let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };
        let adj_r_squared = 1.0 - (n - k_const) as f64 / df_resid * (1.0 - r_squared);

        let (f_statistic, f_p_value) = if df_model > 0.0 {
            let f = ((tss - ssr) / df_model) / scale;
            let p_value = if f.is_finite() {
                distributions::f_sf(f, df_model, df_resid)?
            } else {
                0.0
            };
            (f, p_value)
        } else {
            (f64::NAN, f64::NAN)
        };

        let nf = n as f64;
        let log_likelihood = -nf / 2.0 * (2.0 * PI).ln() - nf / 2.0 * (ssr / nf).ln() - nf / 2.0;
        let aic = -2.0 * log_likelihood + 2.0 * p as f64;
        let bic = -2.0 * log_likelihood + nf.ln() * p as f64;

        let std_errors = (0..p)
            .map(|j| (scale * normalized_cov[(j, j)]).sqrt())
            .collect();
        debug!(r_squared, f_statistic, scale, "ols fit");

        Ok(Self {
            names: design.names.clone(),
            response: response.to_string(),
            coefficients: beta.iter().cloned().collect(),
            std_errors,
            observed: design.y.iter().cloned().collect(),
            fitted: fitted_vec.iter().cloned().collect(),
            residuals: residual_vec.iter().cloned().collect(),
            has_intercept: design.has_intercept,
            summary: ModelSummary {
                n_obs: n,
                df_model,
                df_resid,
                r_squared,
                adj_r_squared,
                f_statistic,
                f_p_value,
                log_likelihood,
                aic,
                bic,
                scale,
                ssr,
            },
            beta,
            normalized_cov,
        })
    }

    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(self.coefficients[idx])
    }

    /// Coefficient, standard error, t, two-sided p and CI bounds per regressor
    pub fn coefficient_table(&self, level: ConfidenceLevel) -> Result<ResultTable> {
        let df = self.summary.df_resid;
        let t_crit = distributions::t_critical(level.alpha(), df)?;
        let mut table = ResultTable::new(coefficient_columns(level.alpha()));
        for (j, name) in self.names.iter().enumerate() {
            let coef = self.coefficients[j];
            let se = self.std_errors[j];
            let t = coef / se;
            let p_value = 2.0 * (1.0 - distributions::t_cdf(t.abs(), df)?);
            table.push_row(
                name.clone(),
                vec![coef, se, t, p_value, coef - t_crit * se, coef + t_crit * se],
            )?;
        }
        Ok(table)
    }

    /// Predictions at the rows of a design matrix built like the fit's
    ///
    /// `extrapolated` is left false for every row; the caller knows the
    /// covariate ranges and marks them.
    pub fn predict(&self, x: &DMatrix<f64>, level: ConfidenceLevel) -> Result<PredictionFrame> {
        let p = self.n_params();
        if x.ncols() != p {
            return Err(Error::size_mismatch(p, x.ncols(), "prediction design columns"));
        }
        let scale = self.summary.scale;
        let t_crit = distributions::t_critical(level.alpha(), self.summary.df_resid)?;

        let mut frame = PredictionFrame::with_capacity(x.nrows());
        for i in 0..x.nrows() {
            let mean: f64 = (0..p).map(|j| x[(i, j)] * self.beta[j]).sum();
            let mut quad = 0.0;
            for a in 0..p {
                for b in 0..p {
                    quad += x[(i, a)] * self.normalized_cov[(a, b)] * x[(i, b)];
                }
            }
            let mean_se = (scale * quad).sqrt();
            let obs_se = (scale * (1.0 + quad)).sqrt();
            frame.mean.push(mean);
            frame.mean_se.push(mean_se);
            frame.mean_ci_lower.push(mean - t_crit * mean_se);
            frame.mean_ci_upper.push(mean + t_crit * mean_se);
            frame.obs_ci_lower.push(mean - t_crit * obs_se);
            frame.obs_ci_upper.push(mean + t_crit * obs_se);
            frame.extrapolated.push(false);
        }
        Ok(frame)
    }

    /// Plain-text report of the fit, every number at full precision
    pub fn summary_text(&self, level: ConfidenceLevel) -> Result<String> {
        let coefficients = self.coefficient_table(level)?;
        let mut out = String::new();
        self.write_summary(&mut out, &coefficients)
            .map_err(|e| Error::Other(e.into()))?;
        Ok(out)
    }

    fn write_summary(&self, out: &mut impl fmt::Write, coefficients: &ResultTable) -> fmt::Result {
        let rule = "=".repeat(72);
        let thin = "-".repeat(72);

        writeln!(out, "Results: Ordinary least squares")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "{:<22}{}", "Model:", "OLS")?;
        writeln!(out, "{:<22}{}", "Dependent Variable:", self.response)?;
        for (label, value) in ModelSummary::ROWS.iter().zip(self.summary.values()) {
            writeln!(out, "{:<22}{}", format!("{label}:"), value)?;
        }
        writeln!(out, "{thin}")?;
        let name_width = self.names.iter().map(|n| n.chars().count()).max().unwrap_or(0).max(8) + 2;
        write!(out, "{:<name_width$}", "")?;
        for column in coefficients.columns() {
            write!(out, "{column:>24}")?;
        }
        writeln!(out)?;
        for row in coefficients.rows() {
            write!(out, "{:<name_width$}", row.label)?;
            for value in &row.values {
                write!(out, "{value:>24}")?;
            }
            writeln!(out)?;
        }
        writeln!(out, "{rule}")
    }
}
