//! Model specification and design matrices

use crate::formula::{ColumnMap, Formula};
use nalgebra::{DMatrix, DVector};
use statbench_core::{Error, Result};

/// Name given to the intercept column of explicit models
pub const EXPLICIT_INTERCEPT: &str = "const";

/// How the response and regressors are built from columns
#[derive(Debug, Clone)]
pub enum ModelSpec {
    /// Response column regressed on predictor columns
    Explicit {
        response: String,
        predictors: Vec<String>,
        intercept: bool,
    },
    /// Response and regressors given by a parsed formula
    Formula(Formula),
}

impl ModelSpec {
    pub fn has_intercept(&self) -> bool {
        match self {
            Self::Explicit { intercept, .. } => *intercept,
            Self::Formula(formula) => formula.intercept,
        }
    }

    /// Design column names, intercept first
    pub fn design_names(&self) -> Vec<String> {
        match self {
            Self::Explicit {
                predictors,
                intercept,
                ..
            } => intercept
                .then(|| EXPLICIT_INTERCEPT.to_string())
                .into_iter()
                .chain(predictors.iter().cloned())
                .collect(),
            Self::Formula(formula) => formula.design_names(),
        }
    }

    pub fn response_label(&self) -> &str {
        match self {
            Self::Explicit { response, .. } => response,
            Self::Formula(formula) => &formula.response.name,
        }
    }

    pub fn response(&self, data: &ColumnMap, n: usize) -> Result<Vec<f64>> {
        match self {
            Self::Explicit { response, .. } => data
                .get(response)
                .cloned()
                .ok_or_else(|| Error::ColumnNotFound(response.clone())),
            Self::Formula(formula) => formula.response.expr.eval(data, n),
        }
    }

    /// Design matrix over `n` rows of `data`
    ///
    /// Only regressor columns are read, so a grid holding just the predictor
    /// columns is enough for prediction.
    pub fn design(&self, data: &ColumnMap, n: usize) -> Result<DMatrix<f64>> {
        let mut columns: Vec<Vec<f64>> = Vec::new();
        if self.has_intercept() {
            columns.push(vec![1.0; n]);
        }
        match self {
            Self::Explicit { predictors, .. } => {
                for name in predictors {
                    let values = data.get(name).ok_or_else(|| Error::ColumnNotFound(name.clone()))?;
                    columns.push(values.clone());
                }
            }
            Self::Formula(formula) => {
                for term in &formula.terms {
                    columns.push(term.eval(data, n)?);
                }
            }
        }
        if columns.is_empty() {
            return Err(Error::InvalidConfiguration(
                "model has no regressors and no intercept".to_string(),
            ));
        }
        Ok(DMatrix::from_fn(n, columns.len(), |i, j| columns[j][i]))
    }
}

/// Response and design after dropping rows with non-finite entries
#[derive(Debug, Clone)]
pub struct Design {
    pub names: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    pub has_intercept: bool,
    /// Positions in the input rows that survived
    pub rows: Vec<usize>,
}

impl Design {
    /// Evaluate `spec` over `data` and keep rows where every value is finite
    ///
    /// Transformations can introduce NaN (`log` of a non-positive value);
    /// those rows are removed the same way missing values are.
    pub fn build(spec: &ModelSpec, data: &ColumnMap, n: usize) -> Result<Self> {
        let y = spec.response(data, n)?;
        let x = spec.design(data, n)?;
        let rows: Vec<usize> = (0..n)
            .filter(|&i| y[i].is_finite() && x.row(i).iter().all(|v| v.is_finite()))
            .collect();
        if rows.is_empty() {
            return Err(Error::EmptyAfterFiltering(format!(
                "no complete rows for {}",
                spec.response_label()
            )));
        }
        Ok(Self {
            names: spec.design_names(),
            x: x.select_rows(rows.iter()),
            y: DVector::from_iterator(rows.len(), rows.iter().map(|&i| y[i])),
            has_intercept: spec.has_intercept(),
            rows,
        })
    }

    pub fn n_obs(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_params(&self) -> usize {
        self.x.ncols()
    }
}
