//! Ordinary least squares regression
//!
//! Fit on the full dataset with an intercept, reporting in-sample
//! predictions, R-squared, and mean-squared-error. The normal equations
//! are solved directly with partial-pivot elimination; the design matrix
//! here is a handful of policy features, never wide enough to need more.

use super::{feature_matrix, target_vector};
use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use serde::Serialize;

/// A fitted linear model
#[derive(Debug, Clone, Serialize)]
pub struct LinearModel {
    pub intercept: f64,
    /// One coefficient per feature, in feature-list order
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Predict a single row of feature values.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// Predict every row of a feature matrix.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_row(r)).collect()
    }
}

/// Result of an OLS fit
#[derive(Debug, Clone, Serialize)]
pub struct LinearFit {
    pub model: LinearModel,
    /// In-sample predictions, one per input row
    pub predictions: Vec<f64>,
    pub r_squared: f64,
    pub mse: f64,
}

/// Fit an OLS model of `target` on `features` over the full dataset.
pub fn fit_linear_regression(
    dataset: &Dataset,
    features: &[&str],
    target: &str,
) -> Result<LinearFit> {
    let x = feature_matrix(dataset, features)?;
    let y = target_vector(dataset, target)?;

    let n = y.len();
    let p = features.len();
    if n == 0 {
        return Err(AnalyticsError::EmptyDataset("no rows to fit"));
    }
    if n <= p {
        return Err(AnalyticsError::InsufficientData { rows: n, cols: p });
    }

    // Normal equations over the intercept-augmented design matrix
    let dim = p + 1;
    let mut ata = vec![vec![0.0f64; dim]; dim];
    let mut atb = vec![0.0f64; dim];
    for (row, &target_value) in x.iter().zip(&y) {
        for i in 0..dim {
            let zi = if i == 0 { 1.0 } else { row[i - 1] };
            atb[i] += zi * target_value;
            for j in 0..dim {
                let zj = if j == 0 { 1.0 } else { row[j - 1] };
                ata[i][j] += zi * zj;
            }
        }
    }

    let solution = solve(ata, atb)?;
    let model = LinearModel {
        intercept: solution[0],
        coefficients: solution[1..].to_vec(),
    };

    let predictions = model.predict(&x);
    let ss_res: f64 = y
        .iter()
        .zip(&predictions)
        .map(|(yi, pi)| (yi - pi).powi(2))
        .sum();
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

    let r_squared = if ss_tot == 0.0 {
        // constant target: a perfect fit scores 1, anything else 0
        if ss_res < f64::EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(LinearFit {
        model,
        predictions,
        r_squared,
        mse: ss_res / n as f64,
    })
}

/// Solve a dense linear system via Gaussian elimination with partial
/// pivoting. Near-zero pivots mean collinear or constant features.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(AnalyticsError::SingularSystem);
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn floats(values: &[f64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Float(v)).collect()
    }

    #[test]
    fn test_perfect_line() {
        let ds = Dataset::new(vec![
            Column::new("x", floats(&[1.0, 2.0, 3.0, 4.0])),
            Column::new("y", floats(&[2.0, 4.0, 6.0, 8.0])),
        ])
        .unwrap();
        let fit = fit_linear_regression(&ds, &["x"], "y").unwrap();

        assert_relative_eq!(fit.model.coefficients[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.model.intercept, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.mse, 0.0, epsilon = 1e-12);
        assert_eq!(fit.predictions.len(), 4);
    }

    #[test]
    fn test_intercept_recovered() {
        // y = 3 + 0.5 x
        let ds = Dataset::new(vec![
            Column::new("x", floats(&[0.0, 2.0, 4.0, 6.0, 8.0])),
            Column::new("y", floats(&[3.0, 4.0, 5.0, 6.0, 7.0])),
        ])
        .unwrap();
        let fit = fit_linear_regression(&ds, &["x"], "y").unwrap();
        assert_relative_eq!(fit.model.intercept, 3.0, epsilon = 1e-9);
        assert_relative_eq!(fit.model.coefficients[0], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_two_features() {
        // y = 1 + 2 x1 - x2
        let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x2 = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(&x2)
            .map(|(a, b)| 1.0 + 2.0 * a - b)
            .collect();
        let ds = Dataset::new(vec![
            Column::new("x1", floats(&x1)),
            Column::new("x2", floats(&x2)),
            Column::new("y", floats(&y)),
        ])
        .unwrap();
        let fit = fit_linear_regression(&ds, &["x1", "x2"], "y").unwrap();
        assert_relative_eq!(fit.model.coefficients[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.model.coefficients[1], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_feature_is_singular() {
        let ds = Dataset::new(vec![
            Column::new("x", floats(&[5.0, 5.0, 5.0])),
            Column::new("y", floats(&[1.0, 2.0, 3.0])),
        ])
        .unwrap();
        assert!(matches!(
            fit_linear_regression(&ds, &["x"], "y"),
            Err(AnalyticsError::SingularSystem)
        ));
    }

    #[test]
    fn test_insufficient_rows() {
        let ds = Dataset::new(vec![
            Column::new("x", floats(&[1.0])),
            Column::new("y", floats(&[2.0])),
        ])
        .unwrap();
        assert!(matches!(
            fit_linear_regression(&ds, &["x"], "y"),
            Err(AnalyticsError::InsufficientData { rows: 1, cols: 1 })
        ));
    }
}
