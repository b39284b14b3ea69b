//! Read-only view of the caller's session
//!
//! The session is owned and mutated by the presentation layer. The engine
//! only borrows it to pick the dataset view an operation should read.

use crate::{DatasetView, Error, Result};

/// Default number of decimals the presentation layer rounds to
pub const DEFAULT_DISPLAY_PRECISION: usize = 4;

/// Datasets and display settings supplied by the caller
#[derive(Debug, Clone)]
pub struct Session<D> {
    dataset: Option<D>,
    filtered_dataset: Option<D>,
    display_precision: usize,
}

impl<D> Default for Session<D> {
    fn default() -> Self {
        Self {
            dataset: None,
            filtered_dataset: None,
            display_precision: DEFAULT_DISPLAY_PRECISION,
        }
    }
}

impl<D: DatasetView> Session<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with a loaded dataset and no active filters
    pub fn with_dataset(dataset: D) -> Self {
        Self {
            dataset: Some(dataset),
            ..Self::default()
        }
    }

    pub fn with_filtered(mut self, filtered: D) -> Self {
        self.filtered_dataset = Some(filtered);
        self
    }

    pub fn with_display_precision(mut self, precision: usize) -> Self {
        self.display_precision = precision;
        self
    }

    /// Full dataset, `MissingDataset` if nothing is loaded
    pub fn dataset(&self) -> Result<&D> {
        self.dataset.as_ref().ok_or(Error::MissingDataset)
    }

    pub fn filtered_dataset(&self) -> Option<&D> {
        self.filtered_dataset.as_ref()
    }

    /// Filtered view when present and non-empty, otherwise the full dataset
    pub fn working_dataset(&self) -> Result<&D> {
        let dataset = self.dataset()?;
        Ok(match &self.filtered_dataset {
            Some(filtered) if !filtered.is_empty() => filtered,
            _ => dataset,
        })
    }

    /// Decimals for display; read by presentation code only
    pub fn display_precision(&self) -> usize {
        self.display_precision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dataset;

    #[test]
    fn test_missing_dataset() {
        let session: Session<Dataset> = Session::new();
        assert!(matches!(session.dataset(), Err(Error::MissingDataset)));
        assert!(matches!(session.working_dataset(), Err(Error::MissingDataset)));
        assert_eq!(session.display_precision(), 4);
    }

    #[test]
    fn test_working_dataset_prefers_non_empty_filter() {
        let full = Dataset::new().with_numeric("x", vec![1.0, 2.0]).unwrap();
        let filtered = Dataset::new().with_numeric("x", vec![1.0]).unwrap();
        let empty = Dataset::new().with_numeric("x", vec![]).unwrap();

        let session = Session::with_dataset(full.clone()).with_filtered(filtered);
        assert_eq!(session.working_dataset().unwrap().n_rows(), 1);

        let session = Session::with_dataset(full).with_filtered(empty);
        assert_eq!(session.working_dataset().unwrap().n_rows(), 2);
    }
}
