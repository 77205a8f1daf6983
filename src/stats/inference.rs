//! Primitive hypothesis tests
//!
//! Test statistics are computed directly from the samples; only the
//! reference distributions (Student's t, Fisher-Snedecor, chi-squared)
//! come from statrs. Mean-comparison p-values are two-sided; F and
//! chi-squared p-values are upper-tail.

use crate::error::{AnalyticsError, Result};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

/// Result of a two-sample mean comparison
#[derive(Debug, Clone, Serialize)]
pub struct TwoSampleTest {
    pub statistic: f64,
    pub p_value: f64,
    pub df: f64,
}

/// Result of a one-way analysis of variance
#[derive(Debug, Clone, Serialize)]
pub struct AnovaTest {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
}

/// Result of a chi-squared independence test
#[derive(Debug, Clone, Serialize)]
pub struct IndependenceTest {
    pub statistic: f64,
    pub p_value: f64,
    pub df: usize,
    /// Expected counts under independence, same shape as the observed table
    pub expected: Vec<Vec<f64>>,
}

/// Options for the chi-squared independence test
#[derive(Debug, Clone)]
pub struct ChiSquareOptions {
    /// Apply Yates' continuity correction on 1-df tables
    pub correction: bool,
}

impl Default for ChiSquareOptions {
    fn default() -> Self {
        Self { correction: true }
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (ddof = 1). Requires at least 2 observations.
pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

fn require_two_observations(values: &[f64], group: &str) -> Result<()> {
    if values.len() < 2 {
        return Err(AnalyticsError::InsufficientObservations {
            group: group.to_string(),
            found: values.len(),
            required: 2,
        });
    }
    Ok(())
}

fn two_sided_t_p_value(t: f64, df: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AnalyticsError::Statistics(e.to_string()))?;
    Ok(2.0 * (1.0 - dist.cdf(t.abs())))
}

/// Build a two-sample result, handling the degenerate zero-variance case
/// deterministically: equal constant groups agree perfectly (p = 1),
/// unequal ones differ certainly (p = 0).
fn finish_two_sample(mean_diff: f64, se: f64, df: f64) -> Result<TwoSampleTest> {
    if se == 0.0 {
        let (statistic, p_value) = if mean_diff == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY.copysign(mean_diff), 0.0)
        };
        return Ok(TwoSampleTest {
            statistic,
            p_value,
            df,
        });
    }
    let statistic = mean_diff / se;
    Ok(TwoSampleTest {
        statistic,
        p_value: two_sided_t_p_value(statistic, df)?,
        df,
    })
}

/// Welch's two-sample t-test (does not assume equal variances).
pub fn welch_t_test(group1: &[f64], group2: &[f64]) -> Result<TwoSampleTest> {
    require_two_observations(group1, "group 1")?;
    require_two_observations(group2, "group 2")?;

    let (n1, n2) = (group1.len() as f64, group2.len() as f64);
    let (var1, var2) = (sample_variance(group1), sample_variance(group2));

    let se_sq = var1 / n1 + var2 / n2;
    if se_sq == 0.0 {
        // Welch-Satterthwaite is undefined here; fall back to pooled df
        return finish_two_sample(mean(group1) - mean(group2), 0.0, n1 + n2 - 2.0);
    }

    // Welch-Satterthwaite degrees of freedom
    let df = se_sq.powi(2)
        / ((var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0));

    finish_two_sample(mean(group1) - mean(group2), se_sq.sqrt(), df)
}

/// Student's two-sample t-test with pooled variance (assumes equal
/// variances).
pub fn student_t_test(group1: &[f64], group2: &[f64]) -> Result<TwoSampleTest> {
    require_two_observations(group1, "group 1")?;
    require_two_observations(group2, "group 2")?;

    let (n1, n2) = (group1.len() as f64, group2.len() as f64);
    let df = n1 + n2 - 2.0;
    let pooled_var = ((n1 - 1.0) * sample_variance(group1)
        + (n2 - 1.0) * sample_variance(group2))
        / df;
    let se = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();

    finish_two_sample(mean(group1) - mean(group2), se, df)
}

/// One-way ANOVA F-test across two or more groups.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Result<AnovaTest> {
    if groups.len() < 2 {
        return Err(AnalyticsError::InsufficientGroups {
            column: "groups".to_string(),
            found: groups.len(),
            required: 2,
        });
    }
    for (i, g) in groups.iter().enumerate() {
        if g.is_empty() {
            return Err(AnalyticsError::InsufficientObservations {
                group: format!("group {i}"),
                found: 0,
                required: 1,
            });
        }
    }

    let n: usize = groups.iter().map(Vec::len).sum();
    let k = groups.len();
    if n <= k {
        return Err(AnalyticsError::InsufficientObservations {
            group: "all groups".to_string(),
            found: n,
            required: k + 1,
        });
    }

    let grand_mean = groups.iter().flatten().sum::<f64>() / n as f64;
    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df_between = k - 1;
    let df_within = n - k;

    if ss_within == 0.0 {
        // All groups constant: identical means agree perfectly, any
        // between-group spread is certain
        let (f_statistic, p_value) = if ss_between == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY, 0.0)
        };
        return Ok(AnovaTest {
            f_statistic,
            p_value,
            df_between,
            df_within,
        });
    }

    let f_statistic =
        (ss_between / df_between as f64) / (ss_within / df_within as f64);
    let dist = FisherSnedecor::new(df_between as f64, df_within as f64)
        .map_err(|e| AnalyticsError::Statistics(e.to_string()))?;

    Ok(AnovaTest {
        f_statistic,
        p_value: 1.0 - dist.cdf(f_statistic),
        df_between,
        df_within,
    })
}

/// Chi-squared test of independence over a contingency table of counts.
pub fn chi_square_independence(
    observed: &[Vec<u64>],
    options: &ChiSquareOptions,
) -> Result<IndependenceTest> {
    let n_rows = observed.len();
    let n_cols = observed.first().map(Vec::len).unwrap_or(0);
    if n_rows < 2 || n_cols < 2 {
        return Err(AnalyticsError::InsufficientGroups {
            column: "contingency table".to_string(),
            found: n_rows.min(n_cols),
            required: 2,
        });
    }
    for row in observed {
        if row.len() != n_cols {
            return Err(AnalyticsError::LengthMismatch {
                left: "first table row",
                left_len: n_cols,
                right: "table row",
                right_len: row.len(),
            });
        }
    }

    let row_totals: Vec<f64> = observed
        .iter()
        .map(|r| r.iter().sum::<u64>() as f64)
        .collect();
    let col_totals: Vec<f64> = (0..n_cols)
        .map(|j| observed.iter().map(|r| r[j] as f64).sum())
        .collect();
    let grand: f64 = row_totals.iter().sum();

    if row_totals.iter().chain(&col_totals).any(|&t| t == 0.0) {
        return Err(AnalyticsError::EmptyDataset(
            "contingency table has an empty row or column",
        ));
    }

    let df = (n_rows - 1) * (n_cols - 1);
    let expected: Vec<Vec<f64>> = (0..n_rows)
        .map(|i| (0..n_cols).map(|j| row_totals[i] * col_totals[j] / grand).collect())
        .collect();

    // Yates' continuity correction applies only to 1-df tables
    let correct = options.correction && df == 1;
    let mut statistic = 0.0;
    for i in 0..n_rows {
        for j in 0..n_cols {
            let mut diff = (observed[i][j] as f64 - expected[i][j]).abs();
            if correct {
                diff = (diff - 0.5).max(0.0);
            }
            statistic += diff.powi(2) / expected[i][j];
        }
    }

    let dist = ChiSquared::new(df as f64)
        .map_err(|e| AnalyticsError::Statistics(e.to_string()))?;

    Ok(IndependenceTest {
        statistic,
        p_value: 1.0 - dist.cdf(statistic),
        df,
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_welch_t_test() {
        let g1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let g2 = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let result = welch_t_test(&g1, &g2).unwrap();

        assert!(result.statistic < 0.0);
        assert!(result.p_value > 0.0 && result.p_value < 1.0);
        assert!(result.df > 0.0);
    }

    #[test]
    fn test_welch_matches_known_value() {
        // scipy.stats.ttest_ind([1,2,3,4], [3,4,5,6], equal_var=False)
        let result = welch_t_test(&[1.0, 2.0, 3.0, 4.0], &[3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_relative_eq!(result.statistic, -2.1908902, epsilon = 1e-6);
        assert_relative_eq!(result.df, 6.0, epsilon = 1e-9);
        assert_relative_eq!(result.p_value, 0.071, epsilon = 1e-3);
    }

    #[test]
    fn test_student_t_uses_pooled_df() {
        let result = student_t_test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0, 7.0]).unwrap();
        assert_relative_eq!(result.df, 5.0, epsilon = 1e-12);
        assert!(result.statistic < 0.0);
    }

    #[test]
    fn test_t_test_rejects_single_observation() {
        let result = welch_t_test(&[1.0], &[2.0, 3.0]);
        assert!(matches!(
            result,
            Err(AnalyticsError::InsufficientObservations { found: 1, .. })
        ));
    }

    #[test]
    fn test_constant_equal_groups_agree() {
        let result = welch_t_test(&[1.0, 1.0, 1.0], &[1.0, 1.0]).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_one_way_anova() {
        let groups = vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 3.0, 4.0],
            vec![3.0, 4.0, 5.0],
        ];
        let result = one_way_anova(&groups).unwrap();
        // scipy.stats.f_oneway gives F = 3.0, p ~ 0.125
        assert_relative_eq!(result.f_statistic, 3.0, epsilon = 1e-9);
        assert_relative_eq!(result.p_value, 0.125, epsilon = 1e-3);
        assert_eq!(result.df_between, 2);
        assert_eq!(result.df_within, 6);
    }

    #[test]
    fn test_anova_requires_two_groups() {
        let result = one_way_anova(&[vec![1.0, 2.0]]);
        assert!(matches!(
            result,
            Err(AnalyticsError::InsufficientGroups { found: 1, .. })
        ));
    }

    #[test]
    fn test_chi_square_balanced_2x2() {
        let table = vec![vec![1, 1], vec![1, 1]];
        let result = chi_square_independence(&table, &ChiSquareOptions::default()).unwrap();
        assert_eq!(result.df, 1);
        assert!(result.statistic.is_finite());
        assert!(result.p_value.is_finite());
        assert_eq!(result.expected, vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
    }

    #[test]
    fn test_chi_square_without_correction() {
        // scipy.stats.chi2_contingency([[10,20],[30,5]], correction=False)
        let table = vec![vec![10, 20], vec![30, 5]];
        let result = chi_square_independence(
            &table,
            &ChiSquareOptions { correction: false },
        )
        .unwrap();
        assert_relative_eq!(result.statistic, 18.7262, epsilon = 1e-4);
        assert_eq!(result.df, 1);
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn test_chi_square_needs_two_by_two() {
        let table = vec![vec![5, 5]];
        let result = chi_square_independence(&table, &ChiSquareOptions::default());
        assert!(matches!(
            result,
            Err(AnalyticsError::InsufficientGroups { .. })
        ));
    }
}
