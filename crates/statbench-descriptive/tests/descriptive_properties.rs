//! Properties of the descriptive table on generated data

use approx::assert_relative_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use statbench_core::{Dataset, Error};
use statbench_descriptive::{describe, describe_sample, DescriptiveOptions};

#[test]
fn test_weighted_column_validation() {
    let dataset = Dataset::new()
        .with_numeric("x", vec![1.0, 2.0, 3.0, 4.0])
        .unwrap()
        .with_numeric("w", vec![1.0, -2.0, 1.0, 1.0])
        .unwrap()
        .with_categorical("label", vec!["a", "b", "c", "d"])
        .unwrap();
    let options = DescriptiveOptions::default();
    assert!(matches!(
        describe(&dataset, "x", Some("w"), &options),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        describe(&dataset, "x", Some("label"), &options),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        describe(&dataset, "label", None, &options),
        Err(Error::NonNumericColumn(_))
    ));
}

#[test]
fn test_corrected_std_is_nearly_unbiased() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let normal = Normal::new(0.0, 2.0).unwrap();
    let trials = 2000;
    let mut plain = 0.0;
    let mut corrected = 0.0;
    for _ in 0..trials {
        let data: Vec<f64> = (0..5).map(|_| normal.sample(&mut rng)).collect();
        let table = describe_sample(&data, None, &DescriptiveOptions::default()).unwrap();
        plain += table.get("Variance", "Bias Corrected").unwrap().sqrt();
        corrected += table.get("Std Dev", "Bias Corrected").unwrap();
    }
    let plain = plain / trials as f64;
    let corrected = corrected / trials as f64;
    // s underestimates σ = 2 by about 6% at n = 5
    assert!(plain < 1.93, "plain {plain}");
    assert!((corrected - 2.0).abs() < 0.08, "corrected {corrected}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_location_rows_are_shift_equivariant(
        data in prop::collection::vec(-100.0f64..100.0, 5..40),
        shift in -50.0f64..50.0,
    ) {
        let options = DescriptiveOptions::default();
        let base = describe_sample(&data, None, &options).unwrap();
        let shifted_data: Vec<f64> = data.iter().map(|x| x + shift).collect();
        let shifted = describe_sample(&shifted_data, None, &options).unwrap();
        for row in ["Mean", "Trimmed Mean", "Winsorized Mean", "Median", "Q(0.25)"] {
            assert_relative_eq!(
                shifted.get(row, "Value").unwrap(),
                base.get(row, "Value").unwrap() + shift,
                epsilon = 1e-9
            );
        }
        assert_relative_eq!(
            shifted.get("Variance", "Value").unwrap(),
            base.get("Variance", "Value").unwrap(),
            epsilon = 1e-6,
            max_relative = 1e-9
        );
    }

    #[test]
    fn prop_quantile_rows_are_ordered(data in prop::collection::vec(-1e3f64..1e3, 2..50)) {
        let options = DescriptiveOptions::default().with_quantiles(vec![0.1, 0.5, 0.9]);
        let table = describe_sample(&data, None, &options).unwrap();
        let min = table.get("Min", "Value").unwrap();
        let q10 = table.get("Q(0.1)", "Value").unwrap();
        let q50 = table.get("Q(0.5)", "Value").unwrap();
        let q90 = table.get("Q(0.9)", "Value").unwrap();
        let max = table.get("Max", "Value").unwrap();
        prop_assert!(min <= q10 && q10 <= q50 && q50 <= q90 && q90 <= max);
        prop_assert_eq!(q50, table.get("Median", "Value").unwrap());
    }
}
