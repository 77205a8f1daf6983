//! Error taxonomy for the analytics pipeline
//!
//! Every failure surfaces to the caller; nothing is retried or silently
//! recovered.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, transforming, testing, or modeling a dataset
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("failed to load data from {path}: {source}")]
    DataLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column '{column}' is not numeric at row {row}")]
    NonNumericColumn { column: String, row: usize },

    #[error("feature column '{0}' must be numeric")]
    NonNumericFeature(String),

    #[error("column '{column}' has {found} distinct non-null group(s); at least {required} required")]
    InsufficientGroups {
        column: String,
        found: usize,
        required: usize,
    },

    #[error("dataset is empty: {0}")]
    EmptyDataset(&'static str),

    #[error("length mismatch: {left} has {left_len} values, {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("normal-equation system is singular; features may be collinear or constant")]
    SingularSystem,

    #[error("group '{group}' needs at least {required} observations, found {found}")]
    InsufficientObservations {
        group: String,
        found: usize,
        required: usize,
    },

    #[error("insufficient data: {rows} row(s) for {cols} feature(s)")]
    InsufficientData { rows: usize, cols: usize },

    #[error("statistical computation failed: {0}")]
    Statistics(String),
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
