//! Property tests for interval ordering, bootstrap bounds and region nesting

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use statbench_confidence::{
    asymptotic, confidence_intervals, confidence_regions, Bootstrap, BootstrapToggles,
    ConfidenceLevel, IntervalRequest, RegionRequest,
};
use statbench_estimators::{DeviationEstimator, MeanEstimator, MedianEstimator};

fn normal_sample(seed: u64, n: usize, mean: f64, sd: f64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(mean, sd).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

fn bootstrap_requests() -> Vec<IntervalRequest> {
    let means = [
        MeanEstimator::SampleMean,
        MeanEstimator::TrimmedMean { alpha: 0.2 },
        MeanEstimator::WinsorizedMean { lower: 0.1, upper: 0.2 },
        MeanEstimator::WeightedMean,
    ];
    let medians = [
        MedianEstimator::SampleMedian,
        MedianEstimator::HarrellDavis,
        MedianEstimator::HodgesLehmann,
        MedianEstimator::WeightedMedian,
    ];
    let deviations = [
        DeviationEstimator::StandardDeviation { ddof: 0 },
        DeviationEstimator::StandardDeviation { ddof: 1 },
        DeviationEstimator::MedianAbsoluteDeviation,
        DeviationEstimator::InterquartileRange,
    ];
    (0..4)
        .map(|i| {
            IntervalRequest::default()
                .with_mean(means[i])
                .with_median(medians[i])
                .with_deviation(deviations[i])
                .with_bootstrap(BootstrapToggles::all())
                .with_resamples(100)
        })
        .collect()
}

fn analytic_requests() -> Vec<IntervalRequest> {
    [
        (MedianEstimator::SampleMedian, 1),
        (MedianEstimator::HarrellDavis, 0),
    ]
    .into_iter()
    .map(|(median, ddof)| {
        IntervalRequest::default()
            .with_median(median)
            .with_deviation(DeviationEstimator::StandardDeviation { ddof })
    })
    .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_analytic_intervals_bracket_estimate(
        seed in any::<u64>(),
        n in 10usize..80,
        level in 0.8f64..0.99,
    ) {
        let data = normal_sample(seed, n, 5.0, 2.0);
        for request in analytic_requests() {
            let request = request.with_level(ConfidenceLevel::new(level).unwrap());
            let summary = confidence_intervals(&data, None, &request).unwrap();
            for ci in [summary.mean, summary.median, summary.deviation] {
                prop_assert!(!ci.method.is_bootstrap());
                prop_assert!(ci.lower <= ci.estimate + 1e-12, "{ci}");
                prop_assert!(ci.estimate <= ci.upper + 1e-12, "{ci}");
            }
        }
    }

    #[test]
    fn prop_bootstrap_intervals_bracket_estimate(
        seed in any::<u64>(),
        n in 6usize..40,
        level in 0.05f64..0.99,
        outlier in 0.0f64..200.0,
    ) {
        let mut data = normal_sample(seed, n, 5.0, 2.0);
        data.push(outlier);
        let weights: Vec<f64> = (0..data.len()).map(|i| 1.0 + (i % 4) as f64).collect();
        for request in bootstrap_requests() {
            let request = request
                .with_level(ConfidenceLevel::new(level).unwrap())
                .with_seed(seed);
            let summary = confidence_intervals(&data, Some(&weights), &request).unwrap();
            for ci in [summary.mean, summary.median, summary.deviation] {
                prop_assert!(ci.method.is_bootstrap());
                prop_assert!(ci.lower <= ci.estimate, "{ci}");
                prop_assert!(ci.estimate <= ci.upper, "{ci}");
            }
        }
    }

    #[test]
    fn prop_bootstrap_bounds_within_distribution(
        data in prop::collection::vec(-1e3f64..1e3, 2..60),
        level in 0.5f64..0.995,
        seed in any::<u64>(),
    ) {
        let bootstrap = Bootstrap::new(200).unwrap().with_seed(seed);
        let estimator = MeanEstimator::TrimmedMean { alpha: 0.1 };
        let distribution = bootstrap.distribution(&data, None, &estimator).unwrap();
        let sorted = distribution.sorted_estimates();
        let center = sorted[sorted.len() / 2];
        let ci = bootstrap
            .interval_from(&distribution, center, ConfidenceLevel::new(level).unwrap())
            .unwrap();
        prop_assert_eq!(distribution.len(), 200);
        prop_assert!(distribution.min() <= ci.lower);
        prop_assert!(ci.lower <= ci.upper);
        prop_assert!(ci.upper <= distribution.max());
    }

    #[test]
    fn prop_regions_nest(
        seed in any::<u64>(),
        n in 5usize..60,
        low in 0.05f64..0.5,
        high in 0.55f64..0.99,
    ) {
        let data = normal_sample(seed, n, 0.0, 1.0);
        let request = RegionRequest::default()
            .with_levels(vec![low, high])
            .with_ci_box(false);
        let set = confidence_regions(&data, None, &request).unwrap();
        let (inner, outer) = (&set.regions[0], &set.regions[1]);

        prop_assert!(inner.area() <= outer.area());
        prop_assert!(outer.sigma_range.0 <= inner.sigma_range.0);
        prop_assert!(inner.sigma_range.1 <= outer.sigma_range.1);
        for &(mu, sigma) in &inner.boundary {
            prop_assert!(outer.contains(mu, sigma));
        }
        // Margins are identical across levels
        let outer_pad = outer.padded_mu_range.1 - outer.mu_range.1;
        let inner_pad = inner.padded_mu_range.1 - inner.mu_range.1;
        prop_assert!((outer_pad - inner_pad).abs() < 1e-9);
    }
}

#[test]
fn test_bootstrap_toggles_report_resamples() {
    let data = normal_sample(1, 40, 10.0, 3.0);
    let request = IntervalRequest::default()
        .with_bootstrap(BootstrapToggles::all())
        .with_resamples(250)
        .with_seed(5);
    let summary = confidence_intervals(&data, None, &request).unwrap();
    for ci in [summary.mean, summary.median, summary.deviation] {
        assert_eq!(ci.method.resamples(), Some(250));
    }
    let table = summary.to_table().unwrap();
    assert_eq!(table.column("Resamples").unwrap(), vec![250.0; 3]);
}

#[test]
fn test_mean_interval_coverage() {
    let trials = 400;
    let covered = (0..trials)
        .filter(|&seed| {
            let data = normal_sample(seed, 25, 3.0, 1.5);
            asymptotic::mean_interval(&data, ConfidenceLevel::NINETY_FIVE)
                .unwrap()
                .contains(3.0)
        })
        .count();
    let coverage = covered as f64 / trials as f64;
    assert!((0.9..=0.99).contains(&coverage), "coverage {coverage}");
}

#[test]
fn test_regions_respond_to_mu_source() {
    let mut data = normal_sample(9, 50, 0.0, 1.0);
    data.push(40.0);
    let mean_based = confidence_regions(&data, None, &RegionRequest::default()).unwrap();
    let median_based = confidence_regions(
        &data,
        None,
        &RegionRequest::default().with_mu_ci_source("Median-based CI".parse().unwrap()),
    )
    .unwrap();
    // The outlier pulls the mean but barely moves the median
    assert!(median_based.estimate.mu < mean_based.estimate.mu);
}
