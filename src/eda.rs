//! Exploratory helpers: descriptive statistics, label encoding, and
//! correlations
//!
//! Everything here is read-only over the dataset except `encode_labels`,
//! which returns a new dataset with the chosen columns recoded.

use crate::dataset::{Column, ColumnType, Dataset, Value};
use crate::error::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Descriptive statistics of one numeric column, nulls excluded
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Describe every numeric column that has at least one present value.
pub fn describe(dataset: &Dataset) -> Result<Vec<ColumnSummary>> {
    let mut summaries = Vec::new();
    for column in dataset.columns() {
        if column.column_type() != ColumnType::Numeric {
            continue;
        }
        let values = dataset.numeric_present(&column.name)?;
        if values.is_empty() {
            continue;
        }
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        };

        summaries.push(ColumnSummary {
            name: column.name.clone(),
            count,
            mean,
            std,
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        });
    }
    Ok(summaries)
}

/// Linearly interpolated quantile of an ascending-sorted slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let position = q * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Recode categorical columns as integer labels.
///
/// Codes follow the ascending sort order of the distinct stringified
/// values, so repeated runs over the same data always agree. Null cells
/// stay null rather than receiving a code.
pub fn encode_labels(dataset: Dataset, columns: &[&str]) -> Result<Dataset> {
    let mut encoded = dataset;
    for &name in columns {
        let labels = encoded.labels(name)?;
        let mapping: BTreeMap<String, i64> = labels
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(code, label)| (label, code as i64))
            .collect();

        let values: Vec<Value> = labels
            .into_iter()
            .map(|label| match label {
                Some(l) => Value::Int(mapping[&l]),
                None => Value::Null,
            })
            .collect();
        encoded = encoded.with_column(Column::new(name, values))?;
    }
    Ok(encoded)
}

/// Pearson correlation matrix over the chosen numeric columns, computed
/// pairwise over rows where both values are present.
pub fn correlation_matrix(dataset: &Dataset, columns: &[&str]) -> Result<Vec<Vec<f64>>> {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|&name| dataset.numeric_values(name))
        .collect::<Result<_>>()?;

    let k = series.len();
    let mut matrix = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let paired: (Vec<f64>, Vec<f64>) = series[i]
                .iter()
                .zip(&series[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            let r = pearson(&paired.0, &paired.1);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Ok(matrix)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 {
        return f64::NAN;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    if var_a == 0.0 || var_b == 0.0 {
        f64::NAN
    } else {
        cov / (var_a * var_b).sqrt()
    }
}
