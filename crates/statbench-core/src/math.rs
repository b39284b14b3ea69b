//! Mathematical utilities shared across the engine
//!
//! Sample moments, the linear-interpolation quantile used everywhere a
//! percentile is read off sorted data, and thin `Result`-returning wrappers
//! around the statrs distributions needed for critical values and p-values.

use crate::{Error, Result};

/// Arithmetic mean. Returns NaN for empty input.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sum of squared deviations from the mean
pub fn sum_of_squares(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum()
}

/// Variance with a delta-degrees-of-freedom adjustment
///
/// `ddof = 1` gives the unbiased sample variance, `ddof = 0` the plug-in
/// (maximum likelihood) variance.
pub fn variance(data: &[f64], ddof: usize) -> Result<f64> {
    let n = data.len();
    if n <= ddof {
        return Err(Error::InsufficientData {
            expected: ddof + 1,
            actual: n,
        });
    }
    Ok(sum_of_squares(data) / (n - ddof) as f64)
}

/// Standard deviation with a delta-degrees-of-freedom adjustment
pub fn std_dev(data: &[f64], ddof: usize) -> Result<f64> {
    variance(data, ddof).map(f64::sqrt)
}

/// Sorted copy of the data (NaN-free input assumed)
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of pre-sorted data by linear interpolation between order statistics
///
/// Position `h = (n - 1) p`; the result interpolates between the order
/// statistics at `floor(h)` and `ceil(h)`. This is the Hyndman-Fan type 7
/// rule, so the result always lies within `[min, max]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(Error::empty_input("quantile"));
    }
    if !(0.0..=1.0).contains(&p) || p.is_nan() {
        return Err(Error::InvalidParameter(format!(
            "Quantile {p} must be in [0, 1]"
        )));
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Quantile of unsorted data by linear interpolation
pub fn quantile(data: &[f64], p: f64) -> Result<f64> {
    quantile_sorted(&sorted(data), p)
}

/// Evenly spaced points over `[start, end]`, endpoints included
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Distribution helpers with validated construction
pub mod distributions {
    use crate::{Error, Result};
    use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};

    fn students_t(df: f64) -> Result<StudentsT> {
        StudentsT::new(0.0, 1.0, df).map_err(|e| Error::distribution("Student's t", e))
    }

    /// Quantile of the standard Student t distribution
    pub fn t_quantile(p: f64, df: f64) -> Result<f64> {
        Ok(students_t(df)?.inverse_cdf(p))
    }

    /// CDF of the standard Student t distribution
    pub fn t_cdf(x: f64, df: f64) -> Result<f64> {
        Ok(students_t(df)?.cdf(x))
    }

    /// Two-sided critical value `t_{1 - alpha/2, df}`
    pub fn t_critical(alpha: f64, df: f64) -> Result<f64> {
        t_quantile(1.0 - alpha / 2.0, df)
    }

    /// Quantile of the standard normal distribution
    pub fn normal_quantile(p: f64) -> Result<f64> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| Error::distribution("normal", e))?;
        Ok(normal.inverse_cdf(p))
    }

    /// CDF of the standard normal distribution
    pub fn normal_cdf(x: f64) -> Result<f64> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| Error::distribution("normal", e))?;
        Ok(normal.cdf(x))
    }

    /// Quantile of the chi-squared distribution
    pub fn chi_squared_quantile(p: f64, df: f64) -> Result<f64> {
        let chi2 = ChiSquared::new(df).map_err(|e| Error::distribution("chi-squared", e))?;
        Ok(chi2.inverse_cdf(p))
    }

    /// Upper tail probability of the chi-squared distribution
    pub fn chi_squared_sf(x: f64, df: f64) -> Result<f64> {
        let chi2 = ChiSquared::new(df).map_err(|e| Error::distribution("chi-squared", e))?;
        Ok(1.0 - chi2.cdf(x))
    }

    /// Upper tail probability of the F distribution
    pub fn f_sf(x: f64, df1: f64, df2: f64) -> Result<f64> {
        let f = FisherSnedecor::new(df1, df2).map_err(|e| Error::distribution("F", e))?;
        Ok(1.0 - f.cdf(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moments() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0);
        assert_relative_eq!(variance(&data, 0).unwrap(), 4.0);
        assert_relative_eq!(std_dev(&data, 0).unwrap(), 2.0);
        assert_relative_eq!(variance(&data, 1).unwrap(), 32.0 / 7.0);
        assert!(variance(&[1.0], 1).is_err());
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile_sorted(&sorted, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile_sorted(&sorted, 1.0).unwrap(), 4.0);
        assert_relative_eq!(quantile_sorted(&sorted, 0.5).unwrap(), 2.5);
        // h = 3 * 0.25 = 0.75
        assert_relative_eq!(quantile_sorted(&sorted, 0.25).unwrap(), 1.75);
        assert!(quantile_sorted(&sorted, 1.5).is_err());
        assert!(quantile_sorted(&[], 0.5).is_err());
    }

    #[test]
    fn test_linspace() {
        let grid = linspace(0.0, 1.0, 5);
        assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 100).len(), 100);
        assert_eq!(*linspace(2.0, 3.0, 100).last().unwrap(), 3.0);
    }

    #[test]
    fn test_critical_values() {
        // Well-known table values
        assert_relative_eq!(
            distributions::t_critical(0.05, 10.0).unwrap(),
            2.228,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            distributions::normal_quantile(0.975).unwrap(),
            1.959964,
            epsilon = 1e-5
        );
        assert_relative_eq!(
            distributions::chi_squared_quantile(0.95, 2.0).unwrap(),
            5.991,
            epsilon = 1e-3
        );
        assert!(distributions::t_quantile(0.5, 0.0).is_err());
    }
}
