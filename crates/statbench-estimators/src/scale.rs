//! Scale estimators
//!
//! The standard deviation is parameterised by `ddof`; the same value must be
//! used wherever the estimator is reused (analytic intervals, bootstrap,
//! prediction intervals) so the interval matches the point estimate.

use crate::location;
use statbench_core::{math, sample::validate_weights, Error, Result};

/// Consistency factor making the MAD estimate σ for normal data
pub const MAD_NORMAL_CONSISTENCY: f64 = 1.482_602_218_505_602;

/// IQR of the standard normal distribution, `2 Φ⁻¹(0.75)`
pub const IQR_NORMAL_CONSISTENCY: f64 = 1.348_979_500_392_163_4;

/// `ddof` may only be 0 or 1
pub fn validate_ddof(ddof: usize) -> Result<()> {
    if ddof > 1 {
        return Err(Error::InvalidParameter(format!(
            "ddof must be 0 or 1, got {ddof}"
        )));
    }
    Ok(())
}

/// Standard deviation with `ddof` adjustment (`n - ddof` in the denominator)
pub fn std_dev(data: &[f64], ddof: usize) -> Result<f64> {
    validate_ddof(ddof)?;
    math::std_dev(data, ddof)
}

/// Weighted variance
///
/// With `reliability = false` this is the plug-in `Σwᵢ(xᵢ-x̄w)²/V₁`; with
/// `reliability = true` it applies the unbiased reliability-weight
/// correction `V₁/(V₁² - V₂)`.
pub fn weighted_variance(data: &[f64], weights: &[f64], reliability: bool) -> Result<f64> {
    let center = location::weighted_mean(data, weights)?;
    let v1: f64 = weights.iter().sum();
    let ss: f64 = data
        .iter()
        .zip(weights)
        .map(|(x, w)| w * (x - center).powi(2))
        .sum();
    if !reliability {
        return Ok(ss / v1);
    }
    let v2: f64 = weights.iter().map(|w| w * w).sum();
    let denom = v1 * v1 - v2;
    if denom <= 0.0 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: weights.iter().filter(|&&w| w > 0.0).count(),
        });
    }
    Ok(ss * v1 / denom)
}

pub fn weighted_std_dev(data: &[f64], weights: &[f64], reliability: bool) -> Result<f64> {
    validate_weights(weights, data.len())?;
    weighted_variance(data, weights, reliability).map(f64::sqrt)
}

/// Median absolute deviation scaled to be consistent for σ under normality
pub fn mad(data: &[f64]) -> Result<f64> {
    let center = location::median(data)?;
    let deviations: Vec<f64> = data.iter().map(|x| (x - center).abs()).collect();
    Ok(location::median(&deviations)? * MAD_NORMAL_CONSISTENCY)
}

/// Interquartile range (linear interpolation)
pub fn iqr(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::empty_input("IQR"));
    }
    let sorted = math::sorted(data);
    Ok(math::quantile_sorted(&sorted, 0.75)? - math::quantile_sorted(&sorted, 0.25)?)
}

/// IQR scaled to be consistent for σ under normality
pub fn normalized_iqr(data: &[f64]) -> Result<f64> {
    Ok(iqr(data)? / IQR_NORMAL_CONSISTENCY)
}

/// Variance of the winsorized sample, `ddof = 1`
pub fn winsorized_variance(data: &[f64], lower: f64, upper: f64) -> Result<f64> {
    let w = location::winsorize(data, lower, upper)?;
    math::variance(&w, 1)
}
