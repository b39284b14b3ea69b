//! Read-only dataset views consumed by the engine
//!
//! The engine never loads or mutates data. It reads columns through the
//! [`DatasetView`] trait, which the in-memory [`Dataset`] implements here and
//! the polars integration implements for `DataFrame`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Columnar table the engine can read from
pub trait DatasetView {
    /// Number of rows
    fn n_rows(&self) -> usize;

    /// Column names in table order
    fn column_names(&self) -> Vec<String>;

    /// Whether the column holds numeric values
    ///
    /// Fails with `ColumnNotFound` for unknown columns.
    fn is_numeric(&self, name: &str) -> Result<bool>;

    /// Numeric column with `None` for missing values
    ///
    /// Fails with `ColumnNotFound` or `NonNumericColumn`.
    fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>>;

    /// Any column rendered as category labels, `None` for missing values
    fn label_column(&self, name: &str) -> Result<Vec<Option<String>>>;

    fn has_column(&self, name: &str) -> bool {
        self.column_names().iter().any(|c| c == name)
    }

    fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Sorted distinct non-missing labels of a column
    fn categories(&self, name: &str) -> Result<Vec<String>> {
        let labels = self.label_column(name)?;
        let distinct: BTreeSet<String> = labels.into_iter().flatten().collect();
        Ok(distinct.into_iter().collect())
    }

    /// Names of the numeric columns
    fn numeric_columns(&self) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|c| self.is_numeric(c).unwrap_or(false))
            .collect()
    }

    /// Names of the non-numeric columns
    fn categorical_columns(&self) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|c| !self.is_numeric(c).unwrap_or(true))
            .collect()
    }
}

/// Values of one in-memory column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn label(&self, row: usize) -> Option<String> {
        match self {
            Self::Numeric(v) => v[row].map(|x| x.to_string()),
            Self::Categorical(v) => v[row].clone(),
        }
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Self::Categorical(v) => Self::Categorical(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Simple in-memory columnar dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric column with no missing values
    pub fn with_numeric(self, name: &str, values: Vec<f64>) -> Result<Self> {
        self.with_column(name, ColumnData::Numeric(values.into_iter().map(Some).collect()))
    }

    /// Add a numeric column that may contain missing values
    pub fn with_optional_numeric(self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        self.with_column(name, ColumnData::Numeric(values))
    }

    /// Add a categorical column with no missing values
    pub fn with_categorical<S: Into<String>>(self, name: &str, values: Vec<S>) -> Result<Self> {
        self.with_column(
            name,
            ColumnData::Categorical(values.into_iter().map(|v| Some(v.into())).collect()),
        )
    }

    /// Add a column, checking the name is unique and the length matches
    pub fn with_column(mut self, name: &str, data: ColumnData) -> Result<Self> {
        if self.columns.iter().any(|c| c.name == name) {
            return Err(Error::InvalidInput(format!("duplicate column '{name}'")));
        }
        if let Some(first) = self.columns.first() {
            if first.data.len() != data.len() {
                return Err(Error::size_mismatch(first.data.len(), data.len(), name));
            }
        }
        self.columns.push(Column {
            name: name.to_string(),
            data,
        });
        Ok(self)
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Keep only rows whose label in each filtered column is one of the
    /// allowed values. Rows with a missing label in a filtered column are
    /// dropped.
    pub fn filter_categories(&self, filters: &[(String, Vec<String>)]) -> Result<Self> {
        let mut keep = vec![true; self.n_rows()];
        for (name, allowed) in filters {
            let labels = self.label_column(name)?;
            for (row, label) in labels.iter().enumerate() {
                keep[row] &= label.as_ref().is_some_and(|l| allowed.contains(l));
            }
        }
        let rows: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        Ok(Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.select(&rows),
                })
                .collect(),
        })
    }
}

impl DatasetView for Dataset {
    fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn is_numeric(&self, name: &str) -> Result<bool> {
        Ok(matches!(self.column(name)?.data, ColumnData::Numeric(_)))
    }

    fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => Ok(values.clone()),
            ColumnData::Categorical(_) => Err(Error::NonNumericColumn(name.to_string())),
        }
    }

    fn label_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.column(name)?;
        Ok((0..column.data.len()).map(|row| column.data.label(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new()
            .with_optional_numeric("x", vec![Some(1.0), None, Some(3.0), Some(4.0)])
            .unwrap()
            .with_categorical("g", vec!["a", "b", "a", "c"])
            .unwrap()
    }

    #[test]
    fn test_column_access() {
        let ds = dataset();
        assert_eq!(ds.n_rows(), 4);
        assert_eq!(ds.column_names(), vec!["x", "g"]);
        assert!(ds.is_numeric("x").unwrap());
        assert!(!ds.is_numeric("g").unwrap());
        assert_eq!(ds.numeric_column("x").unwrap()[1], None);
        assert!(matches!(ds.numeric_column("g"), Err(Error::NonNumericColumn(_))));
        assert!(matches!(ds.numeric_column("y"), Err(Error::ColumnNotFound(_))));
    }

    #[test]
    fn test_column_type_inference() {
        let ds = dataset();
        assert_eq!(ds.numeric_columns(), vec!["x"]);
        assert_eq!(ds.categorical_columns(), vec!["g"]);
        assert_eq!(ds.categories("g").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(ds.categories("x").unwrap(), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_filter_categories() {
        let ds = dataset();
        let filtered = ds
            .filter_categories(&[("g".to_string(), vec!["a".to_string()])])
            .unwrap();
        assert_eq!(filtered.n_rows(), 2);
        assert_eq!(
            filtered.numeric_column("x").unwrap(),
            vec![Some(1.0), Some(3.0)]
        );
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = Dataset::new()
            .with_numeric("x", vec![1.0, 2.0])
            .unwrap()
            .with_numeric("y", vec![1.0]);
        assert!(result.is_err());
    }
}
