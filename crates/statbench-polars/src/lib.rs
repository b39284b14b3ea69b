//! Polars DataFrame integration
//!
//! Implements [`DatasetView`] for `polars::prelude::DataFrame`, so every
//! statbench operation runs directly on a frame:
//!
//! - integer and float columns are numeric and are read as `f64`
//! - every other column is categorical; labels are its values cast to
//!   strings
//! - nulls become `None`, and NaN in a float column is treated as missing
//!
//! Polars failures surface as [`Error::Other`].
//!
//! # Example
//!
//! ```rust
//! use polars::prelude::*;
//! use statbench_core::validation;
//!
//! let df = df!("height" => [1.62, 1.75, 1.80], "group" => ["a", "b", "a"]).unwrap();
//! let sample = validation::numeric_sample(&df, "height").unwrap();
//! assert_eq!(sample.len(), 3);
//! ```

use polars::prelude::*;
use statbench_core::{DatasetView, Error, Result};

fn polars_error(err: PolarsError) -> Error {
    Error::Other(anyhow::Error::new(err))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
    )
}

fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| Error::ColumnNotFound(name.to_string()))
}

impl DatasetView for DataFrame {
    fn n_rows(&self) -> usize {
        self.height()
    }

    fn column_names(&self) -> Vec<String> {
        self.get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn is_numeric(&self, name: &str) -> Result<bool> {
        Ok(is_numeric_dtype(lookup(self, name)?.dtype()))
    }

    fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = lookup(self, name)?;
        if !is_numeric_dtype(column.dtype()) {
            return Err(Error::NonNumericColumn(name.to_string()));
        }
        let cast = column.cast(&DataType::Float64).map_err(polars_error)?;
        let values = cast.as_materialized_series().f64().map_err(polars_error)?;
        Ok(values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    fn label_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = lookup(self, name)?;
        let cast = column.cast(&DataType::String).map_err(polars_error)?;
        let labels = cast.as_materialized_series().str().map_err(polars_error)?;
        Ok(labels
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "x" => [Some(1.0), None, Some(f64::NAN), Some(4.0)],
            "n" => [1i64, 2, 3, 4],
            "g" => [Some("a"), Some("b"), None, Some("a")]
        )
        .unwrap()
    }

    #[test]
    fn test_column_classification() {
        let df = frame();
        assert_eq!(df.n_rows(), 4);
        assert_eq!(df.column_names(), vec!["x", "n", "g"]);
        assert!(df.is_numeric("x").unwrap());
        assert!(df.is_numeric("n").unwrap());
        assert!(!df.is_numeric("g").unwrap());
        assert_eq!(df.numeric_columns(), vec!["x", "n"]);
        assert_eq!(df.categorical_columns(), vec!["g"]);
    }

    #[test]
    fn test_numeric_values() {
        let df = frame();
        assert_eq!(df.numeric_column("x").unwrap(), vec![Some(1.0), None, None, Some(4.0)]);
        assert_eq!(
            df.numeric_column("n").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
        assert!(matches!(df.numeric_column("g"), Err(Error::NonNumericColumn(_))));
        assert!(matches!(df.numeric_column("zzz"), Err(Error::ColumnNotFound(_))));
    }

    #[test]
    fn test_labels() {
        let df = frame();
        assert_eq!(
            df.label_column("g").unwrap(),
            vec![Some("a".to_string()), Some("b".to_string()), None, Some("a".to_string())]
        );
        assert_eq!(df.categories("g").unwrap(), vec!["a", "b"]);
        assert_eq!(df.label_column("n").unwrap()[0].as_deref(), Some("1"));
    }
}
