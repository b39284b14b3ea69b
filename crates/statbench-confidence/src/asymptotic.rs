//! Analytic confidence intervals based on theoretical distributions

use crate::ConfidenceInterval;
use statbench_core::{math, math::distributions, ConfidenceLevel, Error, Result};
use statbench_estimators::quantile::harrell_davis_moments_sorted;
use statrs::distribution::{Binomial, DiscreteCDF};

fn require_two(n: usize) -> Result<()> {
    if n < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: n,
        });
    }
    Ok(())
}

/// Student t interval `estimate ± t_{1-α/2, df} · se`
pub fn t_interval(estimate: f64, std_error: f64, df: f64, level: ConfidenceLevel) -> Result<ConfidenceInterval> {
    if std_error < 0.0 || !std_error.is_finite() {
        return Err(Error::Computation(format!(
            "Standard error {std_error} is not a non-negative finite number"
        )));
    }
    let t = distributions::t_critical(level.alpha(), df)?;
    let margin = t * std_error;
    Ok(ConfidenceInterval::analytic(
        estimate - margin,
        estimate + margin,
        estimate,
        level.value(),
    ))
}

/// t interval for the sample mean with `se = s / √n`, `df = n − 1`
pub fn mean_interval(data: &[f64], level: ConfidenceLevel) -> Result<ConfidenceInterval> {
    require_two(data.len())?;
    let n = data.len() as f64;
    let estimate = math::mean(data);
    let se = math::std_dev(data, 1)? / n.sqrt();
    t_interval(estimate, se, n - 1.0, level)
}

/// Distribution-free interval for the median from order statistics
///
/// Picks the largest `k` with `P(Bin(n, ½) ≤ k − 1) ≤ α/2` and returns
/// `[x₍ₖ₎, x₍ₙ₋ₖ₊₁₎]`, whose coverage is at least the requested level. Too
/// few observations to reach the level is `InsufficientData`.
pub fn median_order_statistic_interval(data: &[f64], level: ConfidenceLevel) -> Result<ConfidenceInterval> {
    require_two(data.len())?;
    let sorted = math::sorted(data);
    let n = sorted.len();
    let tail = level.tail_probability();
    let binomial = Binomial::new(0.5, n as u64).map_err(|e| Error::distribution("binomial", e))?;

    let mut k = 0usize;
    while k < n / 2 && binomial.cdf(k as u64) <= tail {
        k += 1;
    }
    if k == 0 {
        // Smallest n with 2 · 0.5ⁿ ≤ α
        let needed = (2.0 / level.alpha()).log2().ceil() as usize;
        return Err(Error::InsufficientData {
            expected: needed.max(n + 1),
            actual: n,
        });
    }
    Ok(ConfidenceInterval::analytic(
        sorted[k - 1],
        sorted[n - k],
        math::quantile_sorted(&sorted, 0.5)?,
        level.value(),
    ))
}

/// Maritz-Jarrett interval for the Harrell-Davis median
///
/// Normal approximation with the Maritz-Jarrett standard error
/// `sqrt(c₂ − c₁²)` from the Harrell-Davis weights.
pub fn maritz_jarrett_interval(data: &[f64], level: ConfidenceLevel) -> Result<ConfidenceInterval> {
    require_two(data.len())?;
    let moments = harrell_davis_moments_sorted(&math::sorted(data), 0.5)?;
    let z = distributions::normal_quantile(1.0 - level.tail_probability())?;
    let margin = z * moments.standard_error();
    Ok(ConfidenceInterval::analytic(
        moments.c1 - margin,
        moments.c1 + margin,
        moments.c1,
        level.value(),
    ))
}

/// Chi-squared interval for σ matched to a `ddof` convention
///
/// The equal-tailed interval `[√(SS/χ²₁₋α/₂), √(SS/χ²α/₂)]` with `n − 1`
/// degrees of freedom, rescaled by `√((n − 1)/(n − ddof))` so that it
/// brackets the `ddof`-adjusted point estimate.
pub fn std_dev_interval(data: &[f64], ddof: usize, level: ConfidenceLevel) -> Result<ConfidenceInterval> {
    require_two(data.len())?;
    let n = data.len() as f64;
    let df = n - 1.0;
    let ss = math::sum_of_squares(data);
    let scale = (df / (n - ddof as f64)).sqrt();
    let tail = level.tail_probability();
    let chi_hi = distributions::chi_squared_quantile(1.0 - tail, df)?;
    let chi_lo = distributions::chi_squared_quantile(tail, df)?;
    Ok(ConfidenceInterval::analytic(
        (ss / chi_hi).sqrt() * scale,
        (ss / chi_lo).sqrt() * scale,
        math::std_dev(data, ddof)?,
        level.value(),
    ))
}
