//! Shared utilities for integration tests

pub use approx::assert_relative_eq;

use statbench_core::Dataset;

/// Small mixed-type dataset with missing values in both kinds of column
pub fn survey_dataset() -> Dataset {
    Dataset::new()
        .with_optional_numeric(
            "score",
            vec![Some(12.0), Some(15.0), None, Some(9.0), Some(11.0), Some(20.0), Some(14.0)],
        )
        .unwrap()
        .with_optional_numeric(
            "weight",
            vec![Some(1.0), Some(2.0), Some(1.0), Some(0.5), Some(1.0), Some(1.5), Some(1.0)],
        )
        .unwrap()
        .with_column(
            "site",
            statbench_core::ColumnData::Categorical(vec![
                Some("north".to_string()),
                Some("south".to_string()),
                Some("north".to_string()),
                None,
                Some("east".to_string()),
                Some("south".to_string()),
                Some("north".to_string()),
            ]),
        )
        .unwrap()
}
