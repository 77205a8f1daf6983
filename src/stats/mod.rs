//! Hypothesis testing over claims segments
//!
//! `inference` holds the primitive tests, `pairwise` applies them across
//! the distinct groups of a column, and `hypotheses` is the fixed named
//! battery with its interpretation step.

mod hypotheses;
mod inference;
mod pairwise;

pub use hypotheses::{
    gender_risk_test, interpret, interpret_all, provincial_risk_test, run_all_risk_tests,
    zipcode_margin_test, zipcode_risk_test, GroupSummaries, MarginGroupSummary, RiskGroupSummary,
    RiskTestResult, TestInterpretation, GENDER, POSTAL_CODE, PROVINCE, SIGNIFICANCE_LEVEL,
};
pub use inference::{
    chi_square_independence, one_way_anova, student_t_test, welch_t_test, AnovaTest,
    ChiSquareOptions, IndependenceTest, TwoSampleTest,
};
pub use pairwise::{
    chi_square_by_columns, contingency_table, grouped_values, pairwise_t_tests,
    ContingencyTable, PairwiseComparison,
};
