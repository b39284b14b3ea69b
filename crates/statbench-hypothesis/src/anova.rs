//! One-way analysis of variance

use crate::{Alternative, TestResult};
use serde::Serialize;
use statbench_core::{math, math::distributions, Error, ResultTable, Result};
use tracing::{debug, instrument};

pub const ANOVA_COLUMNS: [&str; 6] = [
    "Sum of Squares",
    "df",
    "Mean Square",
    "F",
    "p-value",
    "eta-squared",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneWayAnova {
    pub groups: Vec<String>,
    pub ss_between: f64,
    pub ss_within: f64,
    pub df_between: f64,
    pub df_within: f64,
    pub ms_between: f64,
    pub ms_within: f64,
    /// Share of the total sum of squares explained by the groups
    pub eta_squared: f64,
    pub result: TestResult,
}

impl OneWayAnova {
    /// Between, within and total rows; cells that do not apply are NaN
    pub fn to_table(&self) -> Result<ResultTable> {
        let nan = f64::NAN;
        ResultTable::new(ANOVA_COLUMNS)
            .with_row(
                "Between groups",
                vec![
                    self.ss_between,
                    self.df_between,
                    self.ms_between,
                    self.result.statistic,
                    self.result.p_value,
                    self.eta_squared,
                ],
            )?
            .with_row(
                "Within groups",
                vec![self.ss_within, self.df_within, self.ms_within, nan, nan, nan],
            )?
            .with_row(
                "Total",
                vec![
                    self.ss_between + self.ss_within,
                    self.df_between + self.df_within,
                    nan,
                    nan,
                    nan,
                    nan,
                ],
            )
    }
}

/// One-way ANOVA over labelled groups
///
/// Needs at least two groups and more observations than groups. A zero
/// within-group mean square leaves F undefined and is a `Computation` error.
#[instrument(skip(groups), fields(k = groups.len()))]
pub fn one_way_anova(groups: &[(String, Vec<f64>)], significance: f64) -> Result<OneWayAnova> {
    if groups.len() < 2 {
        return Err(Error::InsufficientGroups {
            expected: 2,
            actual: groups.len(),
        });
    }
    let k = groups.len();
    let total: usize = groups.iter().map(|(_, g)| g.len()).sum();
    if total <= k {
        return Err(Error::InsufficientData {
            expected: k + 1,
            actual: total,
        });
    }

    let grand_mean = groups.iter().flat_map(|(_, g)| g).sum::<f64>() / total as f64;
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for (_, group) in groups {
        let mean = math::mean(group);
        ss_between += group.len() as f64 * (mean - grand_mean).powi(2);
        ss_within += group.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;
    if ms_within <= 0.0 {
        return Err(Error::Computation(
            "within-group variance is zero; the F statistic is undefined".to_string(),
        ));
    }
    let f = ms_between / ms_within;
    let p_value = distributions::f_sf(f, df_between, df_within)?;
    debug!(f, df_between, df_within, p_value, "one-way anova");

    Ok(OneWayAnova {
        groups: groups.iter().map(|(name, _)| name.clone()).collect(),
        ss_between,
        ss_within,
        df_between,
        df_within,
        ms_between,
        ms_within,
        eta_squared: ss_between / (ss_between + ss_within),
        result: TestResult::new(
            f,
            (df_between, Some(df_within)),
            p_value,
            Alternative::Greater,
            significance,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn groups(data: &[&[f64]]) -> Vec<(String, Vec<f64>)> {
        data.iter()
            .enumerate()
            .map(|(i, g)| (format!("g{i}"), g.to_vec()))
            .collect()
    }

    #[test]
    fn test_identical_groups() {
        let g: &[f64] = &[1.0, 2.0, 3.0];
        let anova = one_way_anova(&groups(&[g, g, g]), 0.05).unwrap();
        assert_relative_eq!(anova.result.statistic, 0.0);
        assert_relative_eq!(anova.result.p_value, 1.0);
        assert_eq!(anova.eta_squared, 0.0);
    }

    #[test]
    fn test_hand_calculation() {
        // Means 2, 5, 8; grand mean 5; SSB = 3 * (9 + 0 + 9) = 54; SSW = 6
        let anova = one_way_anova(
            &groups(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]),
            0.05,
        )
        .unwrap();
        assert_relative_eq!(anova.ss_between, 54.0, epsilon = 1e-12);
        assert_relative_eq!(anova.ss_within, 6.0, epsilon = 1e-12);
        assert_relative_eq!(anova.result.statistic, 27.0, epsilon = 1e-12);
        assert_eq!(anova.result.df, (2.0, Some(6.0)));
        assert!(anova.result.decision.is_reject());
        assert_relative_eq!(anova.eta_squared, 0.9, epsilon = 1e-12);

        let table = anova.to_table().unwrap();
        assert_eq!(table.get("Total", "df"), Some(8.0));
        assert!(table.get("Within groups", "F").unwrap().is_nan());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            one_way_anova(&groups(&[&[1.0, 2.0]]), 0.05),
            Err(Error::InsufficientGroups { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            one_way_anova(&groups(&[&[1.0], &[2.0]]), 0.05),
            Err(Error::InsufficientData { .. })
        ));
        assert!(matches!(
            one_way_anova(&groups(&[&[1.0, 1.0], &[2.0, 2.0]]), 0.05),
            Err(Error::Computation(_))
        ));
    }
}
