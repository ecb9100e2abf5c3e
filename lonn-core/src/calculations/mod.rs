//! Tax calculations for recorded salary.
//!
//! The estimator applies a [`crate::TaxSchedule`] to a gross income figure;
//! the summary module rolls a year's payslips up and compares the withheld
//! tax against that estimate.

pub mod common;
pub mod estimator;
pub mod summary;

pub use estimator::TaxEstimator;
pub use summary::{Settlement, YearSummary, available_years};
