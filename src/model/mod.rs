//! Baseline regression models over the claims dataset
//!
//! Feature extraction shares one policy: missing feature values become
//! zero, not the cleaner's median fill, and a non-numeric feature column
//! is rejected before any fitting starts.

mod forest;
mod linear;
mod split;

pub use forest::{fit_random_forest, ForestConfig, ForestFit, RandomForestModel};
pub use linear::{fit_linear_regression, LinearFit, LinearModel};
pub use split::train_test_split;

use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};

/// Extract selected feature columns as row-major `n x p` matrix.
/// Nulls are zero-filled; any other non-numeric cell rejects the column.
pub fn feature_matrix(dataset: &Dataset, features: &[&str]) -> Result<Vec<Vec<f64>>> {
    if features.is_empty() {
        return Err(AnalyticsError::EmptyDataset("no feature columns selected"));
    }

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(features.len());
    for &name in features {
        let values = dataset
            .numeric_values(name)
            .map_err(|err| match err {
                AnalyticsError::NonNumericColumn { column, .. } => {
                    AnalyticsError::NonNumericFeature(column)
                }
                other => other,
            })?;
        columns.push(values.into_iter().map(|v| v.unwrap_or(0.0)).collect());
    }

    let n_rows = dataset.n_rows();
    Ok((0..n_rows)
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect())
}

/// Extract the target column, which must be numeric and fully present.
pub fn target_vector(dataset: &Dataset, target: &str) -> Result<Vec<f64>> {
    dataset
        .numeric_values(target)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| AnalyticsError::NonNumericColumn {
                column: target.to_string(),
                row,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    #[test]
    fn test_feature_matrix_zero_fills_nulls() {
        let ds = Dataset::new(vec![
            Column::new("X1", vec![Value::Float(1.0), Value::Null]),
            Column::new("X2", vec![Value::Int(3), Value::Int(4)]),
        ])
        .unwrap();
        let matrix = feature_matrix(&ds, &["X1", "X2"]).unwrap();
        assert_eq!(matrix, vec![vec![1.0, 3.0], vec![0.0, 4.0]]);
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let ds = Dataset::new(vec![Column::new(
            "Province",
            vec![Value::Text("Gauteng".into())],
        )])
        .unwrap();
        assert!(matches!(
            feature_matrix(&ds, &["Province"]),
            Err(AnalyticsError::NonNumericFeature(col)) if col == "Province"
        ));
    }

    #[test]
    fn test_target_must_be_fully_present() {
        let ds = Dataset::new(vec![Column::new(
            "y",
            vec![Value::Float(1.0), Value::Null],
        )])
        .unwrap();
        assert!(matches!(
            target_vector(&ds, "y"),
            Err(AnalyticsError::NonNumericColumn { row: 1, .. })
        ));
    }
}
