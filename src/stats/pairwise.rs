//! Group-wise comparisons over dataset columns
//!
//! Pairwise mean tests enumerate distinct groups in first-appearance order
//! and consider every unordered pair exactly once; the pair order in the
//! result is stable regardless of the parallel evaluation underneath.

use super::inference::{
    chi_square_independence, welch_t_test, ChiSquareOptions, IndependenceTest, TwoSampleTest,
};
use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Welch comparison of one unordered group pair
#[derive(Debug, Clone, Serialize)]
pub struct PairwiseComparison {
    pub group_a: String,
    pub group_b: String,
    pub t_stat: f64,
    pub p_value: f64,
}

/// Contingency table between two categorical columns, labels sorted
#[derive(Debug, Clone, Serialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

/// Distinct non-null groups of a column in first-appearance order, with the
/// non-null numeric values of `value_col` falling in each.
pub fn grouped_values(
    dataset: &Dataset,
    group_col: &str,
    value_col: &str,
) -> Result<Vec<(String, Vec<f64>)>> {
    let labels = dataset.labels(group_col)?;
    let values = dataset.numeric_values(value_col)?;

    let mut order: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<f64>> = Vec::new();
    for (label, value) in labels.into_iter().zip(values) {
        let Some(label) = label else { continue };
        let idx = match order.iter().position(|g| *g == label) {
            Some(idx) => idx,
            None => {
                order.push(label);
                groups.push(Vec::new());
                order.len() - 1
            }
        };
        if let Some(v) = value {
            groups[idx].push(v);
        }
    }

    Ok(order.into_iter().zip(groups).collect())
}

/// Run Welch's t-test for every unordered pair of distinct groups.
///
/// Result count is k*(k-1)/2 for k groups. Fewer than two distinct
/// non-null groups is an error, never a silent empty result.
pub fn pairwise_t_tests(
    dataset: &Dataset,
    group_col: &str,
    value_col: &str,
) -> Result<Vec<PairwiseComparison>> {
    let groups = grouped_values(dataset, group_col, value_col)?;
    if groups.len() < 2 {
        return Err(AnalyticsError::InsufficientGroups {
            column: group_col.to_string(),
            found: groups.len(),
            required: 2,
        });
    }

    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(groups.len() * (groups.len() - 1) / 2);
    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            pairs.push((i, j));
        }
    }

    // Parallel evaluation; collect preserves the enumeration order
    pairs
        .par_iter()
        .map(|&(i, j)| {
            let (ref name_a, ref vals_a) = groups[i];
            let (ref name_b, ref vals_b) = groups[j];
            let TwoSampleTest {
                statistic, p_value, ..
            } = welch_t_test(vals_a, vals_b)?;
            Ok(PairwiseComparison {
                group_a: name_a.clone(),
                group_b: name_b.clone(),
                t_stat: statistic,
                p_value,
            })
        })
        .collect()
}

/// Cross-tabulate counts of two categorical columns; rows where either
/// cell is null are excluded. Labels are sorted ascending.
pub fn contingency_table(
    dataset: &Dataset,
    group_col: &str,
    value_col: &str,
) -> Result<ContingencyTable> {
    let rows = dataset.labels(group_col)?;
    let cols = dataset.labels(value_col)?;

    let row_labels: Vec<String> = rows
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let col_labels: Vec<String> = cols
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let row_index: BTreeMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let col_index: BTreeMap<&str, usize> = col_labels
        .iter()
        .enumerate()
        .map(|(j, l)| (l.as_str(), j))
        .collect();

    let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
    for (row, col) in rows.iter().zip(&cols) {
        let (Some(row), Some(col)) = (row, col) else {
            continue;
        };
        if let (Some(&i), Some(&j)) = (row_index.get(row.as_str()), col_index.get(col.as_str())) {
            counts[i][j] += 1;
        }
    }

    Ok(ContingencyTable {
        row_labels,
        col_labels,
        counts,
    })
}

/// Chi-squared independence test between two categorical columns.
pub fn chi_square_by_columns(
    dataset: &Dataset,
    group_col: &str,
    value_col: &str,
    options: &ChiSquareOptions,
) -> Result<IndependenceTest> {
    let table = contingency_table(dataset, group_col, value_col)?;
    if table.row_labels.len() < 2 {
        return Err(AnalyticsError::InsufficientGroups {
            column: group_col.to_string(),
            found: table.row_labels.len(),
            required: 2,
        });
    }
    if table.col_labels.len() < 2 {
        return Err(AnalyticsError::InsufficientGroups {
            column: value_col.to_string(),
            found: table.col_labels.len(),
            required: 2,
        });
    }
    chi_square_independence(&table.counts, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    fn text(values: &[&str]) -> Vec<Value> {
        values.iter().map(|s| Value::Text(s.to_string())).collect()
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column::new("Group", text(&["B", "B", "A", "A", "C", "C"])),
            Column::new(
                "Value",
                vec![
                    Value::Float(1.0),
                    Value::Float(2.0),
                    Value::Float(3.0),
                    Value::Float(4.0),
                    Value::Float(5.0),
                    Value::Float(6.0),
                ],
            ),
            Column::new("Cat", text(&["X", "Y", "X", "Y", "X", "Y"])),
        ])
        .unwrap()
    }

    #[test]
    fn test_pair_count_and_order() {
        let results = pairwise_t_tests(&dataset(), "Group", "Value").unwrap();
        // k = 3 groups -> 3 pairs, first-appearance order: B, A, C
        assert_eq!(results.len(), 3);
        assert_eq!((results[0].group_a.as_str(), results[0].group_b.as_str()), ("B", "A"));
        assert_eq!((results[1].group_a.as_str(), results[1].group_b.as_str()), ("B", "C"));
        assert_eq!((results[2].group_a.as_str(), results[2].group_b.as_str()), ("A", "C"));
        for r in &results {
            assert!(r.t_stat.is_finite());
            assert!(r.p_value >= 0.0 && r.p_value <= 1.0);
        }
    }

    #[test]
    fn test_single_group_is_an_error() {
        let ds = Dataset::new(vec![
            Column::new("Group", text(&["A", "A"])),
            Column::new("Value", vec![Value::Float(1.0), Value::Float(2.0)]),
        ])
        .unwrap();
        assert!(matches!(
            pairwise_t_tests(&ds, "Group", "Value"),
            Err(AnalyticsError::InsufficientGroups { found: 1, .. })
        ));
    }

    #[test]
    fn test_null_groups_excluded() {
        let ds = Dataset::new(vec![
            Column::new(
                "Group",
                vec![
                    Value::Text("A".into()),
                    Value::Null,
                    Value::Text("B".into()),
                    Value::Text("A".into()),
                    Value::Text("B".into()),
                ],
            ),
            Column::new(
                "Value",
                vec![
                    Value::Float(1.0),
                    Value::Float(99.0),
                    Value::Float(2.0),
                    Value::Float(3.0),
                    Value::Float(4.0),
                ],
            ),
        ])
        .unwrap();
        let results = pairwise_t_tests(&ds, "Group", "Value").unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_contingency_table_sorted_labels() {
        let table = contingency_table(&dataset(), "Group", "Cat").unwrap();
        assert_eq!(table.row_labels, vec!["A", "B", "C"]);
        assert_eq!(table.col_labels, vec!["X", "Y"]);
        assert_eq!(table.counts, vec![vec![1, 1], vec![1, 1], vec![1, 1]]);
    }

    #[test]
    fn test_chi_square_by_columns() {
        let result =
            chi_square_by_columns(&dataset(), "Group", "Cat", &ChiSquareOptions::default())
                .unwrap();
        assert_eq!(result.df, 2);
        assert!(result.statistic.is_finite());
        assert!(result.p_value.is_finite());
        assert_eq!(result.expected.len(), 3);
    }
}
