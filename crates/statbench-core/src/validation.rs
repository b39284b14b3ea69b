//! Validation layer shared by every engine entry point
//!
//! Column presence and dtype checks, missing-value removal, weight alignment,
//! group materialisation by category set, and parsing of the numeric text
//! fields a workbench front end collects. Everything here fails before any
//! numeric work starts.

use crate::{DatasetView, Error, Result, Sample, WeightedSample};
use std::collections::BTreeMap;
use tracing::debug;

/// Parse a single number from text
///
/// Malformed text is `InvalidInput`.
pub fn parse_number(text: &str, what: &str) -> Result<f64> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidInput(format!("{what}: '{trimmed}' is not a finite number")))
}

/// Parse a comma separated list of numbers
pub fn parse_list(text: &str, what: &str) -> Result<Vec<f64>> {
    let values = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number(s, what))
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        return Err(Error::InvalidInput(format!("{what}: no values given")));
    }
    Ok(values)
}

/// Parse exactly two comma separated numbers
pub fn parse_pair(text: &str, what: &str) -> Result<(f64, f64)> {
    match parse_list(text, what)?.as_slice() {
        &[a, b] => Ok((a, b)),
        values => Err(Error::InvalidInput(format!(
            "{what}: expected exactly two values, got {}",
            values.len()
        ))),
    }
}

/// Parse a pair of non-negative margins, e.g. `"0.1, 0.1"`
pub fn parse_margin_pair(text: &str, what: &str) -> Result<(f64, f64)> {
    let pair = parse_pair(text, what)?;
    validate_margin_pair(pair, what)?;
    Ok(pair)
}

/// Both margins must be finite and non-negative
pub fn validate_margin_pair(pair: (f64, f64), what: &str) -> Result<()> {
    if pair.0 < 0.0 || pair.1 < 0.0 || !pair.0.is_finite() || !pair.1.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "{what}: margins must be non-negative, got ({}, {})",
            pair.0, pair.1
        )));
    }
    Ok(())
}

/// Parse a `"min, max"` range with `min < max`
pub fn parse_range(text: &str, what: &str) -> Result<(f64, f64)> {
    let (lo, hi) = parse_pair(text, what)?;
    validate_range(lo, hi, what)?;
    Ok((lo, hi))
}

pub fn validate_range(lo: f64, hi: f64, what: &str) -> Result<()> {
    if !(lo < hi) {
        return Err(Error::InvalidParameter(format!(
            "{what}: minimum {lo} must be smaller than maximum {hi}"
        )));
    }
    Ok(())
}

/// Probability strictly inside (0, 1)
pub fn validate_probability(p: f64) -> Result<f64> {
    if p > 0.0 && p < 1.0 {
        Ok(p)
    } else {
        Err(Error::invalid_probability(p))
    }
}

pub fn validate_probabilities(ps: &[f64]) -> Result<()> {
    if ps.is_empty() {
        return Err(Error::InvalidParameter(
            "at least one probability is required".to_string(),
        ));
    }
    ps.iter().try_for_each(|&p| validate_probability(p).map(|_| ()))
}

/// Parse a probability list that must already be strictly increasing
pub fn parse_probabilities(text: &str) -> Result<Vec<f64>> {
    let ps = parse_list(text, "probabilities")?;
    validate_probabilities(&ps)?;
    if ps.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidParameter(
            "probabilities must be sorted in strictly increasing order".to_string(),
        ));
    }
    Ok(ps)
}

/// Check every named column exists
pub fn require_columns<D: DatasetView + ?Sized>(dataset: &D, columns: &[&str]) -> Result<()> {
    for column in columns {
        if !dataset.has_column(column) {
            return Err(Error::ColumnNotFound((*column).to_string()));
        }
    }
    Ok(())
}

/// Numeric column with missing values dropped
pub fn numeric_sample<D: DatasetView + ?Sized>(dataset: &D, column: &str) -> Result<Sample> {
    let values = dataset.numeric_column(column)?;
    Sample::from_optional(column, &values)
}

/// Numeric column paired with a weights column
///
/// Rows missing the value are dropped first; the weights are then aligned to
/// the surviving rows. A non-numeric weights column, a missing weight on a
/// kept row, or a negative weight is `InvalidInput`.
pub fn weighted_sample<D: DatasetView + ?Sized>(
    dataset: &D,
    column: &str,
    weights_column: &str,
) -> Result<WeightedSample> {
    let values = dataset.numeric_column(column)?;
    let weights = match dataset.numeric_column(weights_column) {
        Ok(w) => w,
        Err(Error::NonNumericColumn(name)) => {
            return Err(Error::InvalidInput(format!(
                "weights column '{name}' must be numeric"
            )))
        }
        Err(e) => return Err(e),
    };

    let mut kept_values = Vec::with_capacity(values.len());
    let mut kept_weights = Vec::with_capacity(values.len());
    for (value, weight) in values.iter().zip(&weights) {
        let Some(value) = value else { continue };
        let weight = weight.ok_or_else(|| {
            Error::InvalidInput(format!(
                "weights column '{weights_column}' has missing values on rows used by '{column}'"
            ))
        })?;
        kept_values.push(*value);
        kept_weights.push(weight);
    }
    if kept_values.is_empty() {
        return Err(Error::EmptyAfterFiltering(format!(
            "column '{column}' has no non-missing values"
        )));
    }
    WeightedSample::new(kept_values, kept_weights)
}

/// Rows of `value_column` whose `group_column` label is in `categories`
///
/// Missing values are dropped after the category filter. No selected
/// category is `InvalidParameter`; an empty result is `EmptyAfterFiltering`
/// naming the group.
pub fn group_sample<D: DatasetView + ?Sized>(
    dataset: &D,
    value_column: &str,
    group_column: &str,
    categories: &[String],
    group_name: &str,
) -> Result<Sample> {
    if categories.is_empty() {
        return Err(Error::InvalidParameter(format!(
            "{group_name}: select at least one category of '{group_column}'"
        )));
    }
    let values = dataset.numeric_column(value_column)?;
    let labels = dataset.label_column(group_column)?;

    let selected: Vec<f64> = values
        .iter()
        .zip(&labels)
        .filter(|(_, label)| label.as_ref().is_some_and(|l| categories.contains(l)))
        .filter_map(|(value, _)| *value)
        .collect();

    debug!(group = group_name, n = selected.len(), "materialised group");
    if selected.is_empty() {
        return Err(Error::EmptyAfterFiltering(format!(
            "{group_name} is empty after filtering '{group_column}'"
        )));
    }
    Sample::new(selected)
}

/// Split a numeric column by the levels of a grouping column
///
/// Only the selected levels are kept, rows with a missing value in either
/// column are dropped, and groups come back sorted by label. Fewer than two
/// non-empty groups is `InsufficientGroups`.
pub fn grouped_samples<D: DatasetView + ?Sized>(
    dataset: &D,
    value_column: &str,
    group_column: &str,
    levels: &[String],
) -> Result<Vec<(String, Vec<f64>)>> {
    if levels.is_empty() {
        return Err(Error::InvalidParameter(format!(
            "select at least one level of '{group_column}'"
        )));
    }
    let values = dataset.numeric_column(value_column)?;
    let labels = dataset.label_column(group_column)?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (value, label) in values.into_iter().zip(labels) {
        if let (Some(value), Some(label)) = (value, label) {
            if levels.contains(&label) {
                groups.entry(label).or_default().push(value);
            }
        }
    }
    if groups.values().all(Vec::is_empty) {
        return Err(Error::EmptyAfterFiltering(format!(
            "no rows of '{value_column}' match the selected levels of '{group_column}'"
        )));
    }
    if groups.len() < 2 {
        return Err(Error::InsufficientGroups {
            expected: 2,
            actual: groups.len(),
        });
    }
    Ok(groups.into_iter().collect())
}
