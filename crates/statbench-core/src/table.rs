//! Result tables returned by every engine operation
//!
//! A table maps row labels to a fixed set of named numeric columns. Values
//! are stored exactly as computed; formatting for display happens outside
//! the engine. NaN marks a cell that does not apply to its row.

use crate::{Error, Result};
use serde::Serialize;

/// One labelled row of numeric values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Row label -> named numeric columns, full precision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ResultTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; the value count must match the column count
    pub fn push_row(&mut self, label: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::size_mismatch(
                self.columns.len(),
                values.len(),
                "result table row",
            ));
        }
        self.rows.push(TableRow {
            label: label.into(),
            values,
        });
        Ok(())
    }

    pub fn with_row(mut self, label: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.push_row(label, values)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, label: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Cell lookup by row label and column name
    pub fn get(&self, label: &str, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.row(label).map(|r| r.values[col])
    }

    /// All values of one column in row order
    pub fn column(&self, column: &str) -> Option<Vec<f64>> {
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.rows.iter().map(|r| r.values[col]).collect())
    }

    /// Stack another table with the same columns below this one
    pub fn concat(mut self, other: ResultTable) -> Result<Self> {
        if self.columns != other.columns {
            return Err(Error::InvalidInput(
                "cannot concatenate tables with different columns".to_string(),
            ));
        }
        self.rows.extend(other.rows);
        Ok(self)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Other(e.into()))
    }
}
