//! Claims Analytics - Insurance risk analytics over a delimited claims dataset
//!
//! This library provides:
//! - Delimited-file loading and cleaning of tabular claims data
//! - Derived per-policy risk metrics (claim indicator, severity, margin)
//! - Classical hypothesis tests across geographic and demographic segments
//! - Baseline premium models (ordinary least squares, random forest)
//! - Descriptive statistics and label encoding for exploration

pub mod dataset;
pub mod eda;
pub mod error;
pub mod metrics;
pub mod model;
pub mod stats;

// Re-export commonly used types
pub use dataset::{clean, load_claims, CleanOptions, Dataset, Delimiter, LoaderOptions};
pub use error::{AnalyticsError, Result};
pub use metrics::with_risk_metrics;
pub use stats::{interpret_all, run_all_risk_tests, RiskTestResult, TestInterpretation};
