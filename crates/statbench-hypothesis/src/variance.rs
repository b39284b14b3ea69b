//! Tests for equality of variances across groups

use crate::{Alternative, TestResult, VarianceTestKind};
use serde::Serialize;
use statbench_core::{math, math::distributions, Error, ResultTable, Result};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceTest {
    pub kind: VarianceTestKind,
    /// Sample standard deviation (ddof 1) per group
    pub std_devs: Vec<f64>,
    pub result: TestResult,
}

impl VarianceTest {
    pub fn to_table(&self, names: &[String]) -> Result<ResultTable> {
        let mut table = ResultTable::new(["Value"]);
        table.push_row(format!("{} statistic", self.kind), vec![self.result.statistic])?;
        table.push_row("Degrees of freedom", vec![self.result.df.0])?;
        if let Some(df2) = self.result.df.1 {
            table.push_row("Denominator degrees of freedom", vec![df2])?;
        }
        table.push_row("p-value", vec![self.result.p_value])?;
        for (name, sd) in names.iter().zip(&self.std_devs) {
            table.push_row(format!("Standard deviation ({name})"), vec![*sd])?;
        }
        if let [sd1, sd2] = self.std_devs[..] {
            table.push_row("Variance ratio", vec![(sd1 * sd1) / (sd2 * sd2)])?;
        }
        table.push_row("Significance level", vec![self.result.significance])?;
        Ok(table)
    }
}

fn check_groups(groups: &[&[f64]]) -> Result<()> {
    if groups.len() < 2 {
        return Err(Error::InsufficientGroups {
            expected: 2,
            actual: groups.len(),
        });
    }
    for group in groups {
        if group.len() < 2 {
            return Err(Error::InsufficientData {
                expected: 2,
                actual: group.len(),
            });
        }
    }
    Ok(())
}

/// Bartlett's test; sensitive to departures from normality
#[instrument(skip(groups), fields(k = groups.len()))]
pub fn bartlett(groups: &[&[f64]], significance: f64) -> Result<VarianceTest> {
    check_groups(groups)?;
    let k = groups.len() as f64;
    let total: f64 = groups.iter().map(|g| g.len() as f64).sum();
    let variances = groups
        .iter()
        .map(|g| math::variance(g, 1))
        .collect::<Result<Vec<_>>>()?;
    if variances.iter().any(|&v| v <= 0.0) {
        return Err(Error::Computation(
            "Bartlett's test is undefined when a group has zero variance".to_string(),
        ));
    }

    let pooled = groups
        .iter()
        .zip(&variances)
        .map(|(g, v)| (g.len() as f64 - 1.0) * v)
        .sum::<f64>()
        / (total - k);
    let numerator = (total - k) * pooled.ln()
        - groups
            .iter()
            .zip(&variances)
            .map(|(g, v)| (g.len() as f64 - 1.0) * v.ln())
            .sum::<f64>();
    let correction = 1.0
        + (groups.iter().map(|g| 1.0 / (g.len() as f64 - 1.0)).sum::<f64>() - 1.0 / (total - k))
            / (3.0 * (k - 1.0));
    let statistic = numerator / correction;
    let df = k - 1.0;
    let p_value = distributions::chi_squared_sf(statistic, df)?;
    debug!(statistic, df, p_value, "bartlett");

    Ok(VarianceTest {
        kind: VarianceTestKind::Bartlett,
        std_devs: variances.iter().map(|v| v.sqrt()).collect(),
        result: TestResult::new(statistic, (df, None), p_value, Alternative::TwoSided, significance),
    })
}

/// Levene's test on absolute deviations from each group median
#[instrument(skip(groups), fields(k = groups.len()))]
pub fn levene(groups: &[&[f64]], significance: f64) -> Result<VarianceTest> {
    check_groups(groups)?;
    let k = groups.len() as f64;
    let total: f64 = groups.iter().map(|g| g.len() as f64).sum();

    let deviations = groups
        .iter()
        .map(|g| {
            let median = math::quantile(g, 0.5)?;
            Ok(g.iter().map(|x| (x - median).abs()).collect::<Vec<f64>>())
        })
        .collect::<Result<Vec<_>>>()?;
    let group_means: Vec<f64> = deviations.iter().map(|z| math::mean(z)).collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, m)| z.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, m)| z.iter().map(|x| (x - m).powi(2)).sum::<f64>())
        .sum();
    if within <= 0.0 {
        return Err(Error::Computation(
            "Levene's test is undefined when every deviation equals its group mean".to_string(),
        ));
    }

    let (df1, df2) = (k - 1.0, total - k);
    let statistic = (df2 / df1) * between / within;
    let p_value = distributions::f_sf(statistic, df1, df2)?;
    debug!(statistic, df1, df2, p_value, "levene");

    let std_devs = groups
        .iter()
        .map(|g| math::std_dev(g, 1))
        .collect::<Result<Vec<_>>>()?;
    Ok(VarianceTest {
        kind: VarianceTestKind::Levene,
        std_devs,
        result: TestResult::new(statistic, (df1, Some(df2)), p_value, Alternative::TwoSided, significance),
    })
}

/// Run the selected variance test
pub fn variance_test(kind: VarianceTestKind, groups: &[&[f64]], significance: f64) -> Result<VarianceTest> {
    match kind {
        VarianceTestKind::Bartlett => bartlett(groups, significance),
        VarianceTestKind::Levene => levene(groups, significance),
    }
}
