//! One session driving every component over the same dataset

mod common;

use common::{init_tracing, trial_dataset};
use statbench::prelude::*;

#[test]
fn test_missing_dataset_is_reported_before_work() {
    init_tracing();
    let session: Session<Dataset> = Session::new();
    assert!(matches!(session.working_dataset(), Err(Error::MissingDataset)));
}

#[test]
fn test_filtered_view_drives_the_analysis() {
    init_tracing();
    let full = trial_dataset(7);
    let control = full
        .filter_categories(&[("arm".to_string(), vec!["control".to_string()])])
        .unwrap();
    let session = Session::with_dataset(full).with_filtered(control);

    let table = describe(
        session.working_dataset().unwrap(),
        "response",
        None,
        &DescriptiveOptions::default(),
    )
    .unwrap();
    // 30 control rows, two of them missing a response
    assert_eq!(table.get("Count", "Value"), Some(28.0));
}

#[test]
fn test_interval_report_brackets_estimates() {
    init_tracing();
    let session = Session::with_dataset(trial_dataset(11));
    let dataset = session.working_dataset().unwrap();

    let request = IntervalRequest::default().with_seed(3).with_resamples(500);
    let (confidence, prediction, table) =
        interval_report(dataset, "response", Some("weight"), &request).unwrap();
    for ci in [&confidence.mean, &confidence.median, &confidence.deviation] {
        assert!(ci.lower <= ci.estimate && ci.estimate <= ci.upper, "{ci:?}");
    }
    // Prediction intervals cover new observations, so they are wider
    assert!(
        prediction.mean_based.upper - prediction.mean_based.lower
            > confidence.mean.upper - confidence.mean.lower
    );
    assert_eq!(table.len(), 5);
    assert!(!table.to_json().unwrap().is_empty());
}

#[test]
fn test_regions_cover_the_estimate() {
    init_tracing();
    let dataset = trial_dataset(13);
    let regions = run_confidence_regions(&dataset, "response", None, &RegionRequest::default()).unwrap();
    assert_eq!(regions.regions.len(), 5);
    let (mu_lo, mu_hi) = regions.regions[0].mu_range;
    let outer = regions.regions.last().unwrap();
    assert!(outer.mu_range.0 <= mu_lo && mu_hi <= outer.mu_range.1);
}

#[test]
fn test_arms_differ() {
    init_tracing();
    let dataset = trial_dataset(17);
    let test = HypothesisTest::TwoSampleT {
        column: "response".to_string(),
        group1: GroupSelector::new("arm", vec!["control".to_string()]),
        group2: GroupSelector::new("arm", vec!["treated".to_string()]),
        alternative: Alternative::TwoSided,
        welch: true,
        plot: Default::default(),
    };
    let options = TestOptions::default().with_seed(1).with_bootstrap_samples(200);
    let outcome = run_hypothesis_test(&dataset, &test, &options).unwrap();
    assert!(outcome.result.p_value < 1e-4);
    assert_eq!(outcome.result.decision, statbench::hypothesis::Decision::Reject);
    assert!(outcome.figure.is_some());
}

#[test]
fn test_regression_recovers_dose_effect() {
    init_tracing();
    let dataset = trial_dataset(19);
    let request = RegressionRequest::new("response", ["dose"]).with_level(ConfidenceLevel::NINETY_NINE);
    let report = run_linear_regression(&dataset, &request).unwrap();

    assert_eq!(report.fit.summary.n_obs, 56);
    let slope = report.coefficients.get("dose", "Coef.").unwrap();
    let lower = report.coefficients.get("dose", "[0.005").unwrap();
    let upper = report.coefficients.get("dose", "0.995]").unwrap();
    assert!(lower < slope && slope < upper);
    assert!((0.0..1.0).contains(&slope), "slope {slope}");
    assert!(report.figure.to_json().unwrap().contains("Prediction"));
}

#[test]
fn test_dataset_summary_counts_present_values() {
    init_tracing();
    let summary = dataset_summary(&trial_dataset(23)).unwrap();
    assert_eq!(summary.get("response", "count"), Some(56.0));
    assert_eq!(summary.get("arm", "unique"), Some(2.0));
    assert!(summary.get("arm", "mean").unwrap().is_nan());
}
