//! Routing from a test description to its implementation

use crate::{
    anova, figures, t_test, variance, Alternative, GroupSelector, HypothesisTestKind, TestOptions,
    TestOutcome, TwoSamplePlot, VarianceTestKind,
};
use serde::{Deserialize, Serialize};
use statbench_core::{validation, DatasetView, Error, Result};
use tracing::{info, instrument};

fn default_welch() -> bool {
    true
}

/// A fully specified hypothesis test over columns of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum HypothesisTest {
    OneSampleT {
        column: String,
        mu0: f64,
        #[serde(default)]
        alternative: Alternative,
    },
    TwoSampleT {
        column: String,
        group1: GroupSelector,
        group2: GroupSelector,
        #[serde(default)]
        alternative: Alternative,
        #[serde(default = "default_welch")]
        welch: bool,
        #[serde(default)]
        plot: TwoSamplePlot,
    },
    VarianceEquality {
        column: String,
        group1: GroupSelector,
        group2: GroupSelector,
        #[serde(default)]
        kind: VarianceTestKind,
    },
    OneWayAnova {
        column: String,
        factor: String,
        levels: Vec<String>,
    },
}

impl HypothesisTest {
    pub fn kind(&self) -> HypothesisTestKind {
        match self {
            Self::OneSampleT { .. } => HypothesisTestKind::OneSampleT,
            Self::TwoSampleT { .. } => HypothesisTestKind::TwoSampleT,
            Self::VarianceEquality { .. } => HypothesisTestKind::VarianceEquality,
            Self::OneWayAnova { .. } => HypothesisTestKind::OneWayAnova,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Self::OneSampleT { column, .. }
            | Self::TwoSampleT { column, .. }
            | Self::VarianceEquality { column, .. }
            | Self::OneWayAnova { column, .. } => column,
        }
    }

    /// One-sample test with μ₀ given as text
    ///
    /// An empty or non-numeric μ₀ is `InvalidInput`.
    pub fn one_sample_from_text(column: impl Into<String>, mu0: &str, alternative: Alternative) -> Result<Self> {
        if mu0.trim().is_empty() {
            return Err(Error::InvalidInput(
                "μ₀ must be specified for the one-sample t-test".to_string(),
            ));
        }
        Ok(Self::OneSampleT {
            column: column.into(),
            mu0: validation::parse_number(mu0, "μ₀")?,
            alternative,
        })
    }
}

fn materialize_pair<D: DatasetView + ?Sized>(
    dataset: &D,
    column: &str,
    group1: &GroupSelector,
    group2: &GroupSelector,
) -> Result<((String, Vec<f64>), (String, Vec<f64>))> {
    let name1 = group1.display_name("Group 1");
    let name2 = group2.display_name("Group 2");
    let values1 = validation::group_sample(dataset, column, &group1.column, &group1.categories, &name1)?;
    let values2 = validation::group_sample(dataset, column, &group2.column, &group2.categories, &name2)?;
    Ok(((name1, values1.into_values()), (name2, values2.into_values())))
}

/// Validate inputs, run the test and build its table and optional figure
///
/// Every validation failure is raised before any statistic is computed.
///
/// # Example
///
/// ```rust
/// use statbench_core::Dataset;
/// use statbench_hypothesis::{run_hypothesis_test, Alternative, HypothesisTest, TestOptions};
///
/// let dataset = Dataset::new()
///     .with_numeric("weight", vec![5.1, 4.9, 5.3, 5.0, 4.8, 5.2])
///     .unwrap();
/// let test = HypothesisTest::one_sample_from_text("weight", "5.0", Alternative::TwoSided).unwrap();
/// let outcome = run_hypothesis_test(&dataset, &test, &TestOptions::default().with_graph(false)).unwrap();
/// assert!(!outcome.result.decision.is_reject());
/// assert!(outcome.figure.is_none());
/// ```
#[instrument(skip(dataset, options), fields(kind = %test.kind()))]
pub fn run_hypothesis_test<D: DatasetView + ?Sized>(
    dataset: &D,
    test: &HypothesisTest,
    options: &TestOptions,
) -> Result<TestOutcome> {
    options.validate()?;
    let sample = validation::numeric_sample(dataset, test.column())?;
    let significance = options.significance;

    let outcome = match test {
        HypothesisTest::OneSampleT {
            column,
            mu0,
            alternative,
        } => {
            let data = sample.values();
            let summary = t_test::one_sample_t_test(data, *mu0, *alternative, significance)?;
            let figure = if options.include_graph {
                Some(figures::one_sample_figure(column, data, summary.mean, *mu0, options)?)
            } else {
                None
            };
            TestOutcome {
                kind: test.kind(),
                result: summary.result,
                table: summary.to_table()?,
                figure,
            }
        }
        HypothesisTest::TwoSampleT {
            column,
            group1,
            group2,
            alternative,
            welch,
            plot,
        } => {
            let ((name1, values1), (name2, values2)) = materialize_pair(dataset, column, group1, group2)?;
            let summary = t_test::two_sample_t_test(&values1, &values2, *alternative, *welch, significance)?;
            let groups = [(name1.as_str(), values1.as_slice()), (name2.as_str(), values2.as_slice())];
            let figure = match (options.include_graph, plot) {
                (false, _) => None,
                (true, TwoSamplePlot::SampleHistogram) => Some(figures::sample_histogram_figure(column, groups)?),
                (true, TwoSamplePlot::MeanDensity) => Some(figures::mean_density_figure(column, groups, options)?),
            };
            TestOutcome {
                kind: test.kind(),
                result: summary.result,
                table: summary.to_table(&name1, &name2)?,
                figure,
            }
        }
        HypothesisTest::VarianceEquality {
            column,
            group1,
            group2,
            kind,
        } => {
            let ((name1, values1), (name2, values2)) = materialize_pair(dataset, column, group1, group2)?;
            let summary = variance::variance_test(*kind, &[values1.as_slice(), values2.as_slice()], significance)?;
            let figure = if options.include_graph {
                Some(figures::deviation_figure(
                    [(name1.as_str(), values1.as_slice()), (name2.as_str(), values2.as_slice())],
                    options,
                )?)
            } else {
                None
            };
            TestOutcome {
                kind: test.kind(),
                result: summary.result,
                table: summary.to_table(&[name1, name2])?,
                figure,
            }
        }
        HypothesisTest::OneWayAnova {
            column,
            factor,
            levels,
        } => {
            let groups = validation::grouped_samples(dataset, column, factor, levels)?;
            let summary = anova::one_way_anova(&groups, significance)?;
            TestOutcome {
                kind: test.kind(),
                result: summary.result,
                table: summary.to_table()?,
                figure: Some(figures::box_plot_figure(column, factor, &groups)?),
            }
        }
    };

    info!(
        statistic = outcome.result.statistic,
        p_value = outcome.result.p_value,
        decision = %outcome.result.decision,
        "hypothesis test complete"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statbench_core::{Dataset, Layer};

    fn dataset() -> Dataset {
        Dataset::new()
            .with_numeric("y", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 2.5, 3.5, 9.0])
            .unwrap()
            .with_categorical("g", vec!["a", "a", "a", "b", "b", "b", "c", "c", "c"])
            .unwrap()
    }

    fn selector(category: &str) -> GroupSelector {
        GroupSelector::new("g", vec![category.to_string()])
    }

    #[test]
    fn test_two_sample_less_through_dispatch() {
        let test = HypothesisTest::TwoSampleT {
            column: "y".to_string(),
            group1: selector("a"),
            group2: selector("b").named("Treatment"),
            alternative: Alternative::Less,
            welch: true,
            plot: TwoSamplePlot::MeanDensity,
        };
        let outcome = run_hypothesis_test(&dataset(), &test, &TestOptions::default().with_seed(3)).unwrap();
        assert!(outcome.result.statistic < 0.0);
        assert!(outcome.result.p_value < 0.05);
        assert!(outcome.table.row("Mean (Group 1)").is_some());
        assert!(outcome.table.row("Mean (Treatment)").is_some());
        let figure = outcome.figure.unwrap();
        assert_eq!(
            figure.layers().iter().filter(|l| matches!(l, Layer::Histogram { .. })).count(),
            2
        );
    }

    #[test]
    fn test_variance_and_anova() {
        let test = HypothesisTest::VarianceEquality {
            column: "y".to_string(),
            group1: selector("a"),
            group2: selector("c"),
            kind: VarianceTestKind::Levene,
        };
        let outcome = run_hypothesis_test(&dataset(), &test, &TestOptions::default().with_graph(false)).unwrap();
        assert_eq!(outcome.kind, HypothesisTestKind::VarianceEquality);
        assert!(outcome.figure.is_none());

        let test = HypothesisTest::OneWayAnova {
            column: "y".to_string(),
            factor: "g".to_string(),
            levels: vec!["a".into(), "b".into(), "c".into()],
        };
        let outcome = run_hypothesis_test(&dataset(), &test, &TestOptions::default()).unwrap();
        assert_eq!(outcome.table.len(), 3);
        assert_eq!(outcome.figure.unwrap().layers().len(), 3);
    }

    #[test]
    fn test_validation_errors() {
        let options = TestOptions::default();
        assert!(matches!(
            HypothesisTest::one_sample_from_text("y", "  ", Alternative::TwoSided),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            HypothesisTest::one_sample_from_text("y", "abc", Alternative::TwoSided),
            Err(Error::InvalidInput(_))
        ));

        let missing = HypothesisTest::OneSampleT {
            column: "nope".to_string(),
            mu0: 0.0,
            alternative: Alternative::TwoSided,
        };
        assert!(matches!(
            run_hypothesis_test(&dataset(), &missing, &options),
            Err(Error::ColumnNotFound(_))
        ));

        let empty_group = HypothesisTest::TwoSampleT {
            column: "y".to_string(),
            group1: selector("a"),
            group2: selector("zzz"),
            alternative: Alternative::TwoSided,
            welch: true,
            plot: TwoSamplePlot::SampleHistogram,
        };
        assert!(matches!(
            run_hypothesis_test(&dataset(), &empty_group, &options),
            Err(Error::EmptyAfterFiltering(_))
        ));

        let one_level = HypothesisTest::OneWayAnova {
            column: "y".to_string(),
            factor: "g".to_string(),
            levels: vec!["a".into()],
        };
        assert!(matches!(
            run_hypothesis_test(&dataset(), &one_level, &options),
            Err(Error::InsufficientGroups { .. })
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let test: HypothesisTest = serde_json::from_str(
            r#"{"test":"two_sample_t","column":"y",
                "group1":{"column":"g","categories":["a"]},
                "group2":{"column":"g","categories":["b"]}}"#,
        )
        .unwrap();
        match test {
            HypothesisTest::TwoSampleT { welch, plot, alternative, .. } => {
                assert!(welch);
                assert_eq!(plot, TwoSamplePlot::MeanDensity);
                assert_eq!(alternative, Alternative::TwoSided);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
