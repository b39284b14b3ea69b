//! Shared helpers for workspace-level tests

#![allow(dead_code)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use statbench::core::Dataset;
use tracing_subscriber::EnvFilter;

/// Route engine logs to the test writer, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Two-arm trial with a dose covariate, a weight column and a few gaps
pub fn trial_dataset(seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();

    let n = 60;
    let dose: Vec<f64> = (0..n).map(|i| (i % 10) as f64).collect();
    let arm: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "control" } else { "treated" }).collect();
    let response: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if i % 17 == 5 {
                None
            } else {
                let shift = if i % 2 == 0 { 0.0 } else { 3.0 };
                Some(10.0 + 0.5 * dose[i] + shift + noise.sample(&mut rng))
            }
        })
        .collect();
    let weight: Vec<f64> = (0..n).map(|i| 1.0 + (i % 3) as f64).collect();

    Dataset::new()
        .with_numeric("dose", dose)
        .unwrap()
        .with_optional_numeric("response", response)
        .unwrap()
        .with_numeric("weight", weight)
        .unwrap()
        .with_categorical("arm", arm)
        .unwrap()
}
