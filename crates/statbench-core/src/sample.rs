//! Validated samples handed to compute routines
//!
//! A [`Sample`] is never empty and holds only finite values. A
//! [`WeightedSample`] pairs each value with a non-negative weight and has a
//! strictly positive total weight.

use crate::{Error, Result};

/// Ordered, non-empty sequence of finite values with missing values removed
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Validate and wrap the values
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::empty_input("sample"));
        }
        if values.iter().any(|x| !x.is_finite()) {
            return Err(Error::non_finite("sample"));
        }
        Ok(Self { values })
    }

    /// Build a sample from a column with missing entries, dropping them
    pub fn from_optional(column: &str, values: &[Option<f64>]) -> Result<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Err(Error::EmptyAfterFiltering(format!(
                "column '{column}' has no non-missing values"
            )));
        }
        Self::new(present)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed sample; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Require at least `min` observations
    pub fn require(&self, min: usize) -> Result<&Self> {
        if self.len() < min {
            return Err(Error::InsufficientData {
                expected: min,
                actual: self.len(),
            });
        }
        Ok(self)
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for Sample {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Sample paired element-wise with non-negative weights
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSample {
    sample: Sample,
    weights: Vec<f64>,
}

impl WeightedSample {
    /// Validate lengths, signs and total weight
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        let sample = Sample::new(values)?;
        validate_weights(&weights, sample.len())?;
        Ok(Self { sample, weights })
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn values(&self) -> &[f64] {
        self.sample.values()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Check weights are finite, non-negative, aligned and not all zero
pub fn validate_weights(weights: &[f64], expected_len: usize) -> Result<()> {
    if weights.len() != expected_len {
        return Err(Error::size_mismatch(expected_len, weights.len(), "weights"));
    }
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(Error::non_finite("weights"));
    }
    if weights.iter().any(|&w| w < 0.0) {
        return Err(Error::InvalidInput(
            "weights must be non-negative".to_string(),
        ));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(Error::InvalidInput(
            "weights must not all be zero".to_string(),
        ));
    }
    Ok(())
}
