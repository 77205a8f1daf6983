//! Named risk-hypothesis battery
//!
//! Four fixed tests over the segmentation columns: claim-frequency
//! differences across provinces and postal codes, margin differences across
//! postal codes, and claim-frequency differences between genders. Each test
//! carries per-group summary statistics alongside its omnibus statistic,
//! and every result can be interpreted against the 0.05 significance
//! threshold into a decision plus a business recommendation.

use super::inference::{mean, one_way_anova, sample_variance, student_t_test};
use super::pairwise::grouped_values;
use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::metrics::{CLAIM_SEVERITY, HAS_CLAIM, MARGIN};
use log::info;
use serde::Serialize;

/// Province segmentation column
pub const PROVINCE: &str = "Province";
/// Postal-code segmentation column
pub const POSTAL_CODE: &str = "PostalCode";
/// Gender segmentation column
pub const GENDER: &str = "Gender";

/// Fixed significance threshold for null-hypothesis decisions
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Per-group claim-frequency and severity summary
#[derive(Debug, Clone, Serialize)]
pub struct RiskGroupSummary {
    pub group: String,
    /// Mean of the claim indicator: the group's claim frequency
    pub claim_frequency: f64,
    pub policy_count: usize,
    pub severity_mean: f64,
    pub severity_std: f64,
}

/// Per-group margin summary
#[derive(Debug, Clone, Serialize)]
pub struct MarginGroupSummary {
    pub group: String,
    pub margin_mean: f64,
    pub margin_std: f64,
    pub policy_count: usize,
}

/// Group summaries attached to a named test
#[derive(Debug, Clone, Serialize)]
pub enum GroupSummaries {
    Risk(Vec<RiskGroupSummary>),
    Margin(Vec<MarginGroupSummary>),
}

/// Outcome of one named hypothesis test
#[derive(Debug, Clone, Serialize)]
pub struct RiskTestResult {
    pub name: &'static str,
    pub statistic: f64,
    pub p_value: f64,
    pub summaries: GroupSummaries,
}

/// A test result classified against the significance threshold
#[derive(Debug, Clone, Serialize)]
pub struct TestInterpretation {
    pub name: &'static str,
    pub p_value: f64,
    pub statistic: f64,
    pub reject_null: bool,
    pub business_implication: String,
}

impl TestInterpretation {
    pub fn decision(&self) -> &'static str {
        if self.reject_null {
            "Reject"
        } else {
            "Fail to reject"
        }
    }
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        f64::NAN
    } else {
        sample_variance(values).sqrt()
    }
}

/// Claim-frequency and severity summaries per group, sorted by group label.
fn risk_summaries(dataset: &Dataset, group_col: &str) -> Result<Vec<RiskGroupSummary>> {
    let indicators = grouped_values(dataset, group_col, HAS_CLAIM)?;
    let severities = grouped_values(dataset, group_col, CLAIM_SEVERITY)?;

    let mut summaries: Vec<RiskGroupSummary> = indicators
        .iter()
        .zip(&severities)
        .map(|((group, claims), (_, severity))| RiskGroupSummary {
            group: group.clone(),
            claim_frequency: mean(claims),
            policy_count: claims.len(),
            severity_mean: mean(severity),
            severity_std: sample_std(severity),
        })
        .collect();
    summaries.sort_by(|a, b| a.group.cmp(&b.group));
    Ok(summaries)
}

/// Margin summaries per group, sorted by group label.
fn margin_summaries(dataset: &Dataset, group_col: &str) -> Result<Vec<MarginGroupSummary>> {
    let margins = grouped_values(dataset, group_col, MARGIN)?;
    let mut summaries: Vec<MarginGroupSummary> = margins
        .iter()
        .map(|(group, values)| MarginGroupSummary {
            group: group.clone(),
            margin_mean: mean(values),
            margin_std: sample_std(values),
            policy_count: values.len(),
        })
        .collect();
    summaries.sort_by(|a, b| a.group.cmp(&b.group));
    Ok(summaries)
}

/// ANOVA of a numeric column across the groups of a segmentation column.
fn anova_across(dataset: &Dataset, group_col: &str, value_col: &str) -> Result<(f64, f64)> {
    let grouped = grouped_values(dataset, group_col, value_col)?;
    if grouped.len() < 2 {
        return Err(AnalyticsError::InsufficientGroups {
            column: group_col.to_string(),
            found: grouped.len(),
            required: 2,
        });
    }
    let groups: Vec<Vec<f64>> = grouped.into_iter().map(|(_, v)| v).collect();
    let anova = one_way_anova(&groups)?;
    Ok((anova.f_statistic, anova.p_value))
}

/// Claim-frequency differences across provinces (one-way ANOVA).
pub fn provincial_risk_test(dataset: &Dataset) -> Result<RiskTestResult> {
    let (statistic, p_value) = anova_across(dataset, PROVINCE, HAS_CLAIM)?;
    Ok(RiskTestResult {
        name: "provincial_risk",
        statistic,
        p_value,
        summaries: GroupSummaries::Risk(risk_summaries(dataset, PROVINCE)?),
    })
}

/// Claim-frequency differences across postal codes (one-way ANOVA).
pub fn zipcode_risk_test(dataset: &Dataset) -> Result<RiskTestResult> {
    let (statistic, p_value) = anova_across(dataset, POSTAL_CODE, HAS_CLAIM)?;
    Ok(RiskTestResult {
        name: "zipcode_risk",
        statistic,
        p_value,
        summaries: GroupSummaries::Risk(risk_summaries(dataset, POSTAL_CODE)?),
    })
}

/// Margin differences across postal codes (one-way ANOVA).
pub fn zipcode_margin_test(dataset: &Dataset) -> Result<RiskTestResult> {
    let (statistic, p_value) = anova_across(dataset, POSTAL_CODE, MARGIN)?;
    Ok(RiskTestResult {
        name: "zipcode_margin",
        statistic,
        p_value,
        summaries: GroupSummaries::Margin(margin_summaries(dataset, POSTAL_CODE)?),
    })
}

/// Claim-frequency difference between the fixed gender labels `M` and `F`
/// (equal-variance two-sample t-test).
pub fn gender_risk_test(dataset: &Dataset) -> Result<RiskTestResult> {
    let grouped = grouped_values(dataset, GENDER, HAS_CLAIM)?;
    let male = grouped.iter().find(|(g, _)| g == "M").map(|(_, v)| v);
    let female = grouped.iter().find(|(g, _)| g == "F").map(|(_, v)| v);
    let (Some(male), Some(female)) = (male, female) else {
        return Err(AnalyticsError::InsufficientGroups {
            column: GENDER.to_string(),
            found: usize::from(male.is_some()) + usize::from(female.is_some()),
            required: 2,
        });
    };

    let test = student_t_test(male, female)?;
    Ok(RiskTestResult {
        name: "gender_risk",
        statistic: test.statistic,
        p_value: test.p_value,
        summaries: GroupSummaries::Risk(risk_summaries(dataset, GENDER)?),
    })
}

/// Run the full battery in its fixed order.
pub fn run_all_risk_tests(dataset: &Dataset) -> Result<Vec<RiskTestResult>> {
    let tests = [
        provincial_risk_test,
        zipcode_risk_test,
        zipcode_margin_test,
        gender_risk_test,
    ];
    let mut results = Vec::with_capacity(tests.len());
    for test in tests {
        let result = test(dataset)?;
        info!(
            "{}: statistic {:.4}, p-value {:.4}",
            result.name, result.statistic, result.p_value
        );
        results.push(result);
    }
    Ok(results)
}

/// Classify a result against the significance threshold and attach the
/// business recommendation.
pub fn interpret(result: &RiskTestResult) -> TestInterpretation {
    let reject_null = result.p_value < SIGNIFICANCE_LEVEL;
    let business_implication = if reject_null {
        format!(
            "Reject null hypothesis for {}. There is statistically significant evidence \
             of differences. Consider adjusting pricing or risk assessment strategies \
             accordingly.",
            result.name
        )
    } else {
        format!(
            "Fail to reject null hypothesis for {}. No statistically significant evidence \
             of differences found. Current pricing and risk assessment strategies may be \
             appropriate.",
            result.name
        )
    };
    TestInterpretation {
        name: result.name,
        p_value: result.p_value,
        statistic: result.statistic,
        reject_null,
        business_implication,
    }
}

/// Interpret every result of a battery run, preserving order.
pub fn interpret_all(results: &[RiskTestResult]) -> Vec<TestInterpretation> {
    results.iter().map(interpret).collect()
}
