//! Derived risk metrics
//!
//! Pure derivation over the premium and claims columns. Runs after
//! cleaning, so both source columns must be fully numeric; a null or
//! non-numeric cell fails fast instead of producing null metrics.

use crate::dataset::{Column, Dataset, Value};
use crate::error::{AnalyticsError, Result};

/// Claims-amount source column
pub const TOTAL_CLAIMS: &str = "TotalClaims";
/// Premium source column
pub const TOTAL_PREMIUM: &str = "TotalPremium";

/// Derived: whether the policy had any claim
pub const HAS_CLAIM: &str = "has_claim";
/// Derived: claim amount conditional on a claim, else zero
pub const CLAIM_SEVERITY: &str = "claim_severity";
/// Derived: premium collected minus claims paid
pub const MARGIN: &str = "margin";

/// Extend the dataset with `has_claim`, `claim_severity`, and `margin`.
pub fn with_risk_metrics(dataset: Dataset) -> Result<Dataset> {
    let claims = required_numeric(&dataset, TOTAL_CLAIMS)?;
    let premiums = required_numeric(&dataset, TOTAL_PREMIUM)?;

    let has_claim: Vec<Value> = claims.iter().map(|&c| Value::Bool(c > 0.0)).collect();
    let severity: Vec<Value> = claims
        .iter()
        .map(|&c| Value::Float(if c > 0.0 { c } else { 0.0 }))
        .collect();
    let margin: Vec<Value> = premiums
        .iter()
        .zip(&claims)
        .map(|(&p, &c)| Value::Float(p - c))
        .collect();

    dataset
        .with_column(Column::new(HAS_CLAIM, has_claim))?
        .with_column(Column::new(CLAIM_SEVERITY, severity))?
        .with_column(Column::new(MARGIN, margin))
}

/// A fully-present numeric view of a required column.
fn required_numeric(dataset: &Dataset, name: &str) -> Result<Vec<f64>> {
    dataset
        .numeric_values(name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| AnalyticsError::NonNumericColumn {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}
