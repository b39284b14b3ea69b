//! Whole-dataset overview

use ordered_float::OrderedFloat;
use statbench_core::{math, DatasetView, ResultTable, Result};
use std::collections::BTreeSet;
use tracing::instrument;

/// Column order of [`dataset_summary`]
pub const SUMMARY_COLUMNS: [&str; 9] = [
    "count", "unique", "mean", "std", "min", "25%", "50%", "75%", "max",
];

fn numeric_row(values: &[f64]) -> Result<Vec<f64>> {
    let count = values.len() as f64;
    let unique = values.iter().map(|&v| OrderedFloat(v)).collect::<BTreeSet<_>>().len() as f64;
    if values.is_empty() {
        let mut row = vec![count, unique];
        row.extend([f64::NAN; 7]);
        return Ok(row);
    }
    let sorted = math::sorted(values);
    let std = if values.len() > 1 {
        math::std_dev(values, 1)?
    } else {
        f64::NAN
    };
    Ok(vec![
        count,
        unique,
        math::mean(values),
        std,
        sorted[0],
        math::quantile_sorted(&sorted, 0.25)?,
        math::quantile_sorted(&sorted, 0.5)?,
        math::quantile_sorted(&sorted, 0.75)?,
        sorted[sorted.len() - 1],
    ])
}

/// One row per column: count, distinct count and, for numeric columns, the
/// five-number summary with mean and `ddof = 1` standard deviation
///
/// Counts exclude missing values. Categorical columns carry NaN in every
/// numeric cell.
#[instrument(skip(dataset), fields(rows = dataset.n_rows()))]
pub fn dataset_summary<D: DatasetView + ?Sized>(dataset: &D) -> Result<ResultTable> {
    let mut table = ResultTable::new(SUMMARY_COLUMNS);
    for name in dataset.column_names() {
        let row = if dataset.is_numeric(&name)? {
            let values: Vec<f64> = dataset.numeric_column(&name)?.into_iter().flatten().collect();
            numeric_row(&values)?
        } else {
            let labels: Vec<String> = dataset.label_column(&name)?.into_iter().flatten().collect();
            let unique = labels.iter().collect::<BTreeSet<_>>().len();
            let mut row = vec![labels.len() as f64, unique as f64];
            row.extend([f64::NAN; 7]);
            row
        };
        table.push_row(name, row)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use statbench_core::Dataset;

    #[test]
    fn test_mixed_dataset() {
        let dataset = Dataset::new()
            .with_optional_numeric("x", vec![Some(1.0), Some(2.0), Some(2.0), None, Some(5.0)])
            .unwrap()
            .with_categorical("g", vec!["a", "b", "a", "a", "c"])
            .unwrap();
        let table = dataset_summary(&dataset).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("x", "count"), Some(4.0));
        assert_eq!(table.get("x", "unique"), Some(3.0));
        assert_eq!(table.get("x", "mean"), Some(2.5));
        assert_eq!(table.get("x", "50%"), Some(2.0));
        assert_eq!(table.get("x", "max"), Some(5.0));
        assert_relative_eq!(table.get("x", "std").unwrap(), 3.0f64.sqrt(), epsilon = 1e-12);
        assert_eq!(table.get("g", "count"), Some(5.0));
        assert_eq!(table.get("g", "unique"), Some(3.0));
        assert!(table.get("g", "mean").unwrap().is_nan());
    }

    #[test]
    fn test_all_missing_column() {
        let dataset = Dataset::new()
            .with_optional_numeric("x", vec![None, None])
            .unwrap();
        let table = dataset_summary(&dataset).unwrap();
        assert_eq!(table.get("x", "count"), Some(0.0));
        assert!(table.get("x", "min").unwrap().is_nan());
    }
}
