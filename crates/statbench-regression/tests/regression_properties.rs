//! Fitting behaviour on synthetic data

use approx::assert_relative_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use statbench_core::{ConfidenceLevel, Dataset};
use statbench_regression::{
    run_linear_regression, PlotOptions, PredictionGrid, RegressionRequest, GRID_POINTS,
};

fn noisy_line(seed: u64, n: usize, slope: f64, intercept: f64, sd: f64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sd).unwrap();
    let x: Vec<f64> = (0..n).map(|i| i as f64 / 2.0).collect();
    let y = x.iter().map(|x| intercept + slope * x + noise.sample(&mut rng)).collect();
    Dataset::new()
        .with_numeric("x", x)
        .unwrap()
        .with_numeric("y", y)
        .unwrap()
}

#[test]
fn test_recovers_exact_line() {
    let x: Vec<f64> = (0..20).map(f64::from).collect();
    let y = x.iter().map(|x| 2.0 * x + 1.0).collect();
    let dataset = Dataset::new().with_numeric("x", x).unwrap().with_numeric("y", y).unwrap();
    let report = run_linear_regression(&dataset, &RegressionRequest::new("y", ["x"])).unwrap();
    assert_relative_eq!(report.fit.coefficients[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(report.fit.coefficients[1], 2.0, epsilon = 1e-9);
}

#[test]
fn test_formula_matches_explicit_fit() {
    let dataset = noisy_line(3, 40, 1.5, -2.0, 0.7);
    let explicit = run_linear_regression(&dataset, &RegressionRequest::new("y", ["x"])).unwrap();
    let formula = run_linear_regression(
        &dataset,
        &RegressionRequest::new("y", ["x"]).with_formula("y ~ x"),
    )
    .unwrap();
    for (a, b) in explicit.fit.coefficients.iter().zip(&formula.fit.coefficients) {
        assert_relative_eq!(a, b, epsilon = 1e-10);
    }
    assert_relative_eq!(
        explicit.fit.summary.r_squared,
        formula.fit.summary.r_squared,
        epsilon = 1e-12
    );
}

#[test]
fn test_slope_interval_covers_truth() {
    let dataset = noisy_line(17, 60, 0.8, 4.0, 1.0);
    let report = run_linear_regression(
        &dataset,
        &RegressionRequest::new("y", ["x"]).with_level(ConfidenceLevel::NINETY_NINE),
    )
    .unwrap();
    let lower = report.coefficients.get("x", "[0.005").unwrap();
    let upper = report.coefficients.get("x", "0.995]").unwrap();
    assert!(lower < 0.8 && 0.8 < upper, "({lower}, {upper})");
}

#[test]
fn test_wider_level_gives_wider_bands() {
    let dataset = noisy_line(5, 30, 1.0, 0.0, 2.0);
    let plot = PlotOptions::default().with_grid(PredictionGrid::Range { min: 0.0, max: 20.0 });
    let narrow = run_linear_regression(
        &dataset,
        &RegressionRequest::new("y", ["x"]).with_plot(plot).with_level(ConfidenceLevel::NINETY),
    )
    .unwrap();
    let wide = run_linear_regression(
        &dataset,
        &RegressionRequest::new("y", ["x"]).with_plot(plot).with_level(ConfidenceLevel::NINETY_NINE),
    )
    .unwrap();
    let narrow = narrow.grid.unwrap().frame;
    let wide = wide.grid.unwrap().frame;
    assert_eq!(narrow.len(), GRID_POINTS);
    for i in 0..GRID_POINTS {
        assert_relative_eq!(narrow.mean[i], wide.mean[i], epsilon = 1e-12);
        assert!(wide.obs_ci_upper[i] - wide.obs_ci_lower[i] > narrow.obs_ci_upper[i] - narrow.obs_ci_lower[i]);
    }
    // x spans [0, 14.5]; the tail of the grid is extrapolated
    assert!(narrow.extrapolated[GRID_POINTS - 1]);
    assert!(!narrow.extrapolated[0]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_residuals_sum_to_zero_with_intercept(
        y in prop::collection::vec(-100.0f64..100.0, 6..40),
        slope in -5.0f64..5.0,
    ) {
        let n = y.len();
        let x: Vec<f64> = (0..n).map(|i| (i as f64).sqrt() + slope * (i % 3) as f64).collect();
        let dataset = Dataset::new()
            .with_numeric("x", x)
            .unwrap()
            .with_numeric("y", y)
            .unwrap();
        if let Ok(report) = run_linear_regression(&dataset, &RegressionRequest::new("y", ["x"])) {
            let total: f64 = report.fit.residuals.iter().sum();
            let scale: f64 = report.fit.observed.iter().map(|v| v.abs()).sum::<f64>().max(1.0);
            prop_assert!(total.abs() / scale < 1e-8);
            let r2 = report.fit.summary.r_squared;
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&r2));
            for i in 0..n {
                prop_assert!(report.fitted.mean_ci_lower[i] <= report.fitted.mean[i]);
                prop_assert!(report.fitted.obs_ci_upper[i] >= report.fitted.mean_ci_upper[i]);
            }
        }
    }
}
