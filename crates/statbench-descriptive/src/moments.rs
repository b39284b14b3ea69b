//! Shape statistics and bias corrections

use statbench_core::{math, Error, Result};
use statrs::function::gamma::ln_gamma;

/// Central moment of order `k` with divisor `n`
pub fn central_moment(data: &[f64], k: i32) -> f64 {
    let m = math::mean(data);
    data.iter().map(|x| (x - m).powi(k)).sum::<f64>() / data.len() as f64
}

/// Fisher-Pearson skewness `g1 = m3 / m2^1.5`
///
/// NaN for constant data.
pub fn skewness(data: &[f64]) -> f64 {
    central_moment(data, 3) / central_moment(data, 2).powf(1.5)
}

/// Adjusted skewness `G1 = g1 √(n(n-1)) / (n-2)`, NaN below three values
pub fn adjusted_skewness(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if data.len() < 3 {
        return f64::NAN;
    }
    skewness(data) * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

/// Excess kurtosis `g2 = m4 / m2² - 3`
pub fn excess_kurtosis(data: &[f64]) -> f64 {
    central_moment(data, 4) / central_moment(data, 2).powi(2) - 3.0
}

/// Adjusted excess kurtosis
/// `G2 = ((n+1) g2 + 6) (n-1) / ((n-2)(n-3))`, NaN below four values
pub fn adjusted_excess_kurtosis(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if data.len() < 4 {
        return f64::NAN;
    }
    ((n + 1.0) * excess_kurtosis(data) + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
}

/// `c4(n) = √(2/(n-1)) Γ(n/2) / Γ((n-1)/2)`
///
/// `E[s] = c4(n) σ` for normal samples of size `n`, with `s` the `ddof = 1`
/// standard deviation.
pub fn c4(n: usize) -> Result<f64> {
    if n < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: n,
        });
    }
    let n = n as f64;
    Ok((2.0 / (n - 1.0)).sqrt() * (ln_gamma(n / 2.0) - ln_gamma((n - 1.0) / 2.0)).exp())
}

/// Jackknife bias-corrected estimate `n θ̂ - (n-1) θ̄₍.₎`
///
/// `θ̄₍.₎` is the mean of the `n` leave-one-out estimates.
pub fn jackknife<F>(data: &[f64], estimate: f64, statistic: F) -> Result<f64>
where
    F: Fn(&[f64]) -> Result<f64>,
{
    let n = data.len();
    if n < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: n,
        });
    }
    let mut buffer = Vec::with_capacity(n - 1);
    let mut total = 0.0;
    for i in 0..n {
        buffer.clear();
        buffer.extend_from_slice(&data[..i]);
        buffer.extend_from_slice(&data[i + 1..]);
        total += statistic(&buffer)?;
    }
    let nf = n as f64;
    Ok(nf * estimate - (nf - 1.0) * total / nf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_of_symmetric_data() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(skewness(&data), 0.0, epsilon = 1e-12);
        // m2 = 2, m4 = 6.8
        assert_relative_eq!(excess_kurtosis(&data), 6.8 / 4.0 - 3.0, epsilon = 1e-12);
        assert!(skewness(&[2.0, 2.0, 2.0]).is_nan());
    }

    #[test]
    fn test_adjusted_shape() {
        let data = [1.0, 2.0, 2.0, 3.0, 9.0];
        let g1 = skewness(&data);
        assert!(g1 > 0.0);
        assert_relative_eq!(adjusted_skewness(&data), g1 * 20f64.sqrt() / 3.0, epsilon = 1e-12);
        assert!(adjusted_skewness(&[1.0, 2.0]).is_nan());
        assert!(adjusted_excess_kurtosis(&[1.0, 2.0, 4.0]).is_nan());
    }

    #[test]
    fn test_c4_values() {
        assert_relative_eq!(c4(2).unwrap(), (2.0 / std::f64::consts::PI).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(c4(10).unwrap(), 0.972_659_274_1, epsilon = 1e-9);
        assert!(c4(1).is_err());
    }

    #[test]
    fn test_jackknife_identities() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let mean = math::mean(&data);
        let corrected = jackknife(&data, mean, |d| Ok(math::mean(d))).unwrap();
        assert_relative_eq!(corrected, mean, epsilon = 1e-12);

        // Jackknifing the plug-in variance gives the unbiased variance
        let plug_in = math::variance(&data, 0).unwrap();
        let corrected = jackknife(&data, plug_in, |d| math::variance(d, 0)).unwrap();
        assert_relative_eq!(corrected, math::variance(&data, 1).unwrap(), epsilon = 1e-10);

        assert!(jackknife(&[1.0], 1.0, |d| Ok(math::mean(d))).is_err());
    }
}
