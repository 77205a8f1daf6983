//! Column-oriented dataset
//!
//! The whole toolkit operates on one of these: the loader produces it, the
//! cleaner and metric calculator return transformed copies, and the test
//! and model layers read it.

use super::value::{ColumnType, Value};
use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};

/// A named column of dynamically-typed cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Type the column's non-null cells agree on.
    pub fn column_type(&self) -> ColumnType {
        let mut seen_any = false;
        let mut all_numeric = true;
        let mut all_dates = true;
        for v in &self.values {
            if v.is_null() {
                continue;
            }
            seen_any = true;
            all_numeric &= v.is_numeric();
            all_dates &= matches!(v, Value::Date(_));
        }
        if !seen_any {
            ColumnType::Empty
        } else if all_numeric {
            ColumnType::Numeric
        } else if all_dates {
            ColumnType::Date
        } else {
            ColumnType::Text
        }
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

/// An in-memory table of named columns, all of equal length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from columns, enforcing equal lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        for col in &columns {
            if col.len() != n_rows {
                return Err(AnalyticsError::LengthMismatch {
                    left: "first column",
                    left_len: n_rows,
                    right: "column",
                    right_len: col.len(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing fast when it is absent.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()))
    }

    /// Per-row numeric view of a column: `None` for nulls, error for any
    /// cell that cannot be read as a number.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.require_column(name)?;
        col.values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                if v.is_null() {
                    Ok(None)
                } else {
                    v.as_f64()
                        .map(Some)
                        .ok_or_else(|| AnalyticsError::NonNumericColumn {
                            column: name.to_string(),
                            row,
                        })
                }
            })
            .collect()
    }

    /// Non-null numeric cells of a column, in row order.
    pub fn numeric_present(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self
            .numeric_values(name)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Per-row group labels: the stringified cell for non-null entries.
    pub fn labels(&self, name: &str) -> Result<Vec<Option<String>>> {
        let col = self.require_column(name)?;
        Ok(col
            .values
            .iter()
            .map(|v| {
                if v.is_null() {
                    None
                } else {
                    Some(v.to_string())
                }
            })
            .collect())
    }

    /// Return a new dataset with the column appended, or replaced when a
    /// column of the same name already exists.
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(AnalyticsError::LengthMismatch {
                left: "dataset",
                left_len: self.n_rows,
                right: "new column",
                right_len: column.len(),
            });
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }
}
