//! Dataset cleaning
//!
//! Median-fills missing numeric values and parses the transaction-date
//! column. Unparsable dates are coerced to null, never raised. The input is
//! consumed and a cleaned dataset returned; cleaning an already-clean
//! dataset is a no-op.

use super::frame::{Column, Dataset};
use super::value::{ColumnType, Value};
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

/// Cleaning configuration
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Column parsed into dates when present in the dataset
    pub date_column: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            date_column: "TransactionMonth".to_string(),
        }
    }
}

/// Clean a dataset: fill numeric nulls with the column median and parse the
/// configured date column.
pub fn clean(dataset: Dataset, options: &CleanOptions) -> Result<Dataset> {
    let mut cleaned = dataset;

    let numeric_names: Vec<String> = cleaned
        .columns()
        .iter()
        .filter(|c| c.column_type() == ColumnType::Numeric)
        .map(|c| c.name.clone())
        .collect();

    for name in numeric_names {
        let values = cleaned.numeric_values(&name)?;
        let present: Vec<f64> = values.iter().copied().flatten().collect();
        if present.len() == values.len() || present.is_empty() {
            continue;
        }
        let fill = median(&present);
        debug!(
            "filling {} null(s) in '{}' with median {}",
            values.len() - present.len(),
            name,
            fill
        );
        let filled: Vec<Value> = values
            .into_iter()
            .map(|v| Value::Float(v.unwrap_or(fill)))
            .collect();
        cleaned = cleaned.with_column(Column::new(name, filled))?;
    }

    if let Some(col) = cleaned.column(&options.date_column) {
        let parsed: Vec<Value> = col.values.iter().map(parse_date_cell).collect();
        let name = options.date_column.clone();
        cleaned = cleaned.with_column(Column::new(name, parsed))?;
    }

    Ok(cleaned)
}

/// Median of a non-empty slice: midpoint average for even lengths.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn parse_date_cell(value: &Value) -> Value {
    match value {
        Value::Date(d) => Value::Date(*d),
        Value::Text(s) => parse_date(s).map(Value::Date).unwrap_or(Value::Null),
        // Numeric or null cells have no date interpretation
        _ => Value::Null,
    }
}

/// Try the date shapes seen in claims exports, most specific first.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(columns: Vec<Column>) -> Dataset {
        Dataset::new(columns).unwrap()
    }

    #[test]
    fn test_median_fill() {
        let data = ds(vec![Column::new(
            "TotalClaims",
            vec![Value::Float(1.0), Value::Null, Value::Float(3.0)],
        )]);
        let cleaned = clean(data, &CleanOptions::default()).unwrap();
        assert_eq!(
            cleaned.numeric_present("TotalClaims").unwrap(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[5.0]), 5.0);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let data = ds(vec![Column::new(
            "TotalPremium",
            vec![Value::Float(10.0), Value::Null, Value::Float(30.0)],
        )]);
        let once = clean(data, &CleanOptions::default()).unwrap();
        let twice = clean(once.clone(), &CleanOptions::default()).unwrap();
        assert_eq!(
            once.numeric_present("TotalPremium").unwrap(),
            twice.numeric_present("TotalPremium").unwrap()
        );
    }

    #[test]
    fn test_date_parsing_coerces_failures() {
        let data = ds(vec![Column::new(
            "TransactionMonth",
            vec![
                Value::Text("2015-03-01 00:00:00".into()),
                Value::Text("not a date".into()),
                Value::Text("2015-04-01".into()),
            ],
        )]);
        let cleaned = clean(data, &CleanOptions::default()).unwrap();
        let col = cleaned.column("TransactionMonth").unwrap();
        assert_eq!(col.null_count(), 1);
        assert_eq!(
            col.values[0],
            Value::Date(NaiveDate::from_ymd_opt(2015, 3, 1).unwrap())
        );
        assert_eq!(
            col.values[2],
            Value::Date(NaiveDate::from_ymd_opt(2015, 4, 1).unwrap())
        );
    }

    #[test]
    fn test_all_null_column_left_alone() {
        let data = ds(vec![Column::new(
            "Mystery",
            vec![Value::Null, Value::Null],
        )]);
        let cleaned = clean(data, &CleanOptions::default()).unwrap();
        assert_eq!(cleaned.column("Mystery").unwrap().null_count(), 2);
    }
}
