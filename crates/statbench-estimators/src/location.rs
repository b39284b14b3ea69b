//! Location estimators
//!
//! Every function is a pure map from a sample (and optional weights or
//! parameters) to a scalar. Parameters are checked before any work is done
//! and out-of-range values fail instead of being clamped.

use statbench_core::{math, sample::validate_weights, Error, Result};

fn require_non_empty(data: &[f64], operation: &str) -> Result<()> {
    if data.is_empty() {
        return Err(Error::empty_input(operation));
    }
    Ok(())
}

/// Trim fraction must lie in [0, 0.5)
pub fn validate_trim(alpha: f64) -> Result<()> {
    if !(0.0..0.5).contains(&alpha) {
        return Err(Error::InvalidParameter(format!(
            "trim fraction {alpha} must be in [0, 0.5)"
        )));
    }
    Ok(())
}

/// Winsor limits each in [0, 0.5) with `lower + upper < 1`
pub fn validate_winsor_limits(lower: f64, upper: f64) -> Result<()> {
    for (name, limit) in [("lower", lower), ("upper", upper)] {
        if !(0.0..0.5).contains(&limit) {
            return Err(Error::InvalidParameter(format!(
                "{name} winsor limit {limit} must be in [0, 0.5)"
            )));
        }
    }
    if lower + upper >= 1.0 {
        return Err(Error::InvalidParameter(format!(
            "winsor limits ({lower}, {upper}) must sum to less than 1"
        )));
    }
    Ok(())
}

/// Arithmetic mean
pub fn mean(data: &[f64]) -> Result<f64> {
    require_non_empty(data, "mean")?;
    Ok(math::mean(data))
}

/// Mean after removing `floor(alpha * n)` values from each end
///
/// # Example
///
/// ```rust
/// use statbench_estimators::location::trimmed_mean;
///
/// let m = trimmed_mean(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], 0.2).unwrap();
/// assert_eq!(m, 3.5);
/// ```
pub fn trimmed_mean(data: &[f64], alpha: f64) -> Result<f64> {
    validate_trim(alpha)?;
    require_non_empty(data, "trimmed mean")?;
    let sorted = math::sorted(data);
    let n = sorted.len();
    let cut = (alpha * n as f64).floor() as usize;
    if 2 * cut >= n {
        return Err(Error::InvalidParameter(format!(
            "trimming {cut} values from each end of {n} leaves nothing"
        )));
    }
    Ok(math::mean(&sorted[cut..n - cut]))
}

/// Clamp the lowest `floor(lower * n)` and highest `floor(upper * n)` values
/// to the nearest retained order statistic. Output keeps input order.
pub fn winsorize(data: &[f64], lower: f64, upper: f64) -> Result<Vec<f64>> {
    validate_winsor_limits(lower, upper)?;
    require_non_empty(data, "winsorize")?;
    let sorted = math::sorted(data);
    let n = sorted.len();
    let lo_count = (lower * n as f64).floor() as usize;
    let hi_count = (upper * n as f64).floor() as usize;
    if lo_count + hi_count >= n {
        return Err(Error::InvalidParameter(format!(
            "winsor limits ({lower}, {upper}) clamp every value of a sample of {n}"
        )));
    }
    let floor = sorted[lo_count];
    let ceiling = sorted[n - 1 - hi_count];
    Ok(data.iter().map(|&x| x.clamp(floor, ceiling)).collect())
}

/// Mean of the winsorized sample
pub fn winsorized_mean(data: &[f64], lower: f64, upper: f64) -> Result<f64> {
    Ok(math::mean(&winsorize(data, lower, upper)?))
}

/// `Σ wᵢxᵢ / Σ wᵢ`
pub fn weighted_mean(data: &[f64], weights: &[f64]) -> Result<f64> {
    require_non_empty(data, "weighted mean")?;
    validate_weights(weights, data.len())?;
    let total: f64 = weights.iter().sum();
    Ok(data.iter().zip(weights).map(|(x, w)| x * w).sum::<f64>() / total)
}

/// Sample median (average of the two middle values for even n)
pub fn median(data: &[f64]) -> Result<f64> {
    require_non_empty(data, "median")?;
    math::quantile(data, 0.5)
}

/// Weighted median
///
/// The smallest value whose cumulative weight reaches half the total; when
/// the cumulative weight lands exactly on half, the midpoint with the next
/// positively weighted value. Zero-weight observations are ignored.
pub fn weighted_median(data: &[f64], weights: &[f64]) -> Result<f64> {
    require_non_empty(data, "weighted median")?;
    validate_weights(weights, data.len())?;

    let mut pairs: Vec<(f64, f64)> = data
        .iter()
        .zip(weights)
        .filter(|&(_, &w)| w > 0.0)
        .map(|(&x, &w)| (x, w))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let half = pairs.iter().map(|p| p.1).sum::<f64>() / 2.0;
    let tolerance = half * 1e-12;
    let mut cumulative = 0.0;
    for (i, &(x, w)) in pairs.iter().enumerate() {
        cumulative += w;
        if (cumulative - half).abs() <= tolerance && i + 1 < pairs.len() {
            return Ok((x + pairs[i + 1].0) / 2.0);
        }
        if cumulative >= half {
            return Ok(x);
        }
    }
    // Unreachable with positive total weight; fall back to the largest value
    pairs
        .last()
        .map(|p| p.0)
        .ok_or_else(|| Error::InvalidInput("weights must not all be zero".to_string()))
}

/// Hodges-Lehmann estimator: median of all pairwise Walsh averages
/// `(xᵢ + xⱼ) / 2` for `i ≤ j`
pub fn hodges_lehmann(data: &[f64]) -> Result<f64> {
    require_non_empty(data, "Hodges-Lehmann")?;
    let n = data.len();
    let mut walsh = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            walsh.push((data[i] + data[j]) / 2.0);
        }
    }
    math::quantile(&walsh, 0.5)
}
