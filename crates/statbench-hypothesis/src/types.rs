//! Shared vocabulary for hypothesis tests

use serde::{Deserialize, Serialize};
use statbench_core::{Error, Figure, ResultTable, Result};
use statbench_confidence::DEFAULT_RESAMPLES;
use std::fmt;
use std::str::FromStr;

/// Alternative hypothesis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    #[default]
    TwoSided,
    Greater,
    Less,
}

impl Alternative {
    /// p-value of a statistic whose null distribution has the given CDF
    pub fn p_value(&self, statistic: f64, cdf: impl Fn(f64) -> Result<f64>) -> Result<f64> {
        Ok(match self {
            Self::TwoSided => (2.0 * (1.0 - cdf(statistic.abs())?)).min(1.0),
            Self::Greater => 1.0 - cdf(statistic)?,
            Self::Less => cdf(statistic)?,
        })
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoSided => write!(f, "two-sided"),
            Self::Greater => write!(f, "greater"),
            Self::Less => write!(f, "less"),
        }
    }
}

impl FromStr for Alternative {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "two-sided" => Ok(Self::TwoSided),
            "greater" => Ok(Self::Greater),
            "less" => Ok(Self::Less),
            other => Err(Error::InvalidParameter(format!(
                "unknown alternative '{other}', expected two-sided, greater or less"
            ))),
        }
    }
}

/// Test for equality of two variances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarianceTestKind {
    Bartlett,
    /// Levene's test centred on group medians (Brown-Forsythe)
    #[default]
    Levene,
}

impl fmt::Display for VarianceTestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bartlett => write!(f, "Bartlett"),
            Self::Levene => write!(f, "Levene"),
        }
    }
}

impl FromStr for VarianceTestKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Bartlett" => Ok(Self::Bartlett),
            "Levene" => Ok(Self::Levene),
            other => Err(Error::InvalidParameter(format!("unknown variance test '{other}'"))),
        }
    }
}

/// Companion plot of the two-sample t-test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwoSamplePlot {
    /// Overlaid histograms of both groups
    SampleHistogram,
    /// Bootstrap distributions of both group means
    #[default]
    MeanDensity,
}

impl FromStr for TwoSamplePlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Sample Histogram" => Ok(Self::SampleHistogram),
            "Mean Density" => Ok(Self::MeanDensity),
            other => Err(Error::InvalidParameter(format!("unknown plot type '{other}'"))),
        }
    }
}

/// Test names as presented to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HypothesisTestKind {
    OneSampleT,
    TwoSampleT,
    VarianceEquality,
    OneWayAnova,
}

impl HypothesisTestKind {
    pub const ALL: [Self; 4] = [
        Self::OneSampleT,
        Self::TwoSampleT,
        Self::VarianceEquality,
        Self::OneWayAnova,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneSampleT => "One sample Student's t-test",
            Self::TwoSampleT => "Two samples Student's t-test",
            Self::VarianceEquality => "Equal variance between two groups",
            Self::OneWayAnova => "One-way ANOVA",
        }
    }
}

impl fmt::Display for HypothesisTestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HypothesisTestKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == s.trim())
            .ok_or_else(|| Error::InvalidParameter(format!("unknown hypothesis test '{s}'")))
    }
}

/// Rows selected by category membership in one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSelector {
    pub column: String,
    pub categories: Vec<String>,
    /// Display name; empty falls back to "Group 1" or "Group 2"
    #[serde(default)]
    pub name: String,
}

impl GroupSelector {
    pub fn new(column: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            column: column.into(),
            categories,
            name: String::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) fn display_name(&self, fallback: &str) -> String {
        if self.name.trim().is_empty() {
            fallback.to_string()
        } else {
            self.name.clone()
        }
    }
}

/// Options shared by every test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestOptions {
    pub include_graph: bool,
    /// Resamples for the bootstrap companion plots
    pub bootstrap_samples: usize,
    pub seed: Option<u64>,
    /// Level below which the null hypothesis is rejected
    pub significance: f64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            include_graph: true,
            bootstrap_samples: DEFAULT_RESAMPLES,
            seed: None,
            significance: 0.05,
        }
    }
}

impl TestOptions {
    pub fn with_graph(mut self, include_graph: bool) -> Self {
        self.include_graph = include_graph;
        self
    }

    pub fn with_bootstrap_samples(mut self, n: usize) -> Self {
        self.bootstrap_samples = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        statbench_core::validation::validate_probability(self.significance)?;
        statbench_confidence::validate_resamples(self.bootstrap_samples)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Reject,
    FailToReject,
}

impl Decision {
    pub fn from_p_value(p_value: f64, significance: f64) -> Self {
        if p_value < significance {
            Self::Reject
        } else {
            Self::FailToReject
        }
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Self::Reject)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "Reject H0"),
            Self::FailToReject => write!(f, "Fail to reject H0"),
        }
    }
}

/// Outcome shared by all test families
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    /// Degrees of freedom; `(df1, df2)` for F statistics
    pub df: (f64, Option<f64>),
    pub p_value: f64,
    pub alternative: Alternative,
    pub significance: f64,
    pub decision: Decision,
}

impl TestResult {
    pub fn new(statistic: f64, df: (f64, Option<f64>), p_value: f64, alternative: Alternative, significance: f64) -> Self {
        Self {
            statistic,
            df,
            p_value,
            alternative,
            significance,
            decision: Decision::from_p_value(p_value, significance),
        }
    }
}

/// Result, table and optional figure of a dispatched test
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub kind: HypothesisTestKind,
    pub result: TestResult,
    pub table: ResultTable,
    pub figure: Option<Figure>,
}
