//! Yearly roll-up of recorded payslips.
//!
//! Sums a year's gross, net and withheld amounts, runs the estimator on the
//! gross total and reports whether the withheld tax looks like it will lead
//! to a refund or to back tax.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::TaxEstimator;
use crate::{SalaryEntry, TaxCalculationResult, TaxSchedule};

/// Expected outcome of the annual settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    /// More tax was withheld than estimated.
    Refund,
    /// Less tax was withheld than estimated.
    BackTax,
    Balanced,
}

impl Settlement {
    pub fn from_difference(difference: Decimal) -> Self {
        if difference > Decimal::ZERO {
            Self::Refund
        } else if difference < Decimal::ZERO {
            Self::BackTax
        } else {
            Self::Balanced
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Refund => "expected refund",
            Self::BackTax => "expected back tax",
            Self::Balanced => "balanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub schedule_name: String,
    pub entry_count: usize,
    pub total_gross: Decimal,
    pub total_net: Decimal,
    pub total_withheld: Decimal,
    pub estimate: TaxCalculationResult,
    /// `total_withheld - estimate.total_tax`.
    pub difference: Decimal,
}

impl YearSummary {
    /// Builds the summary for `year` from any set of entries; entries dated
    /// in other years are ignored.
    pub fn from_entries(
        year: i32,
        entries: &[SalaryEntry],
        schedule: &TaxSchedule,
    ) -> Self {
        let in_year: Vec<&SalaryEntry> = entries.iter().filter(|e| e.year() == year).collect();

        let total_gross: Decimal = in_year.iter().map(|e| e.gross_salary).sum();
        let total_net: Decimal = in_year.iter().map(|e| e.net_salary).sum();
        let total_withheld: Decimal = in_year.iter().map(|e| e.tax_withheld).sum();

        let estimate = TaxEstimator::new(schedule).estimate(total_gross);
        let difference = total_withheld - estimate.total_tax;

        Self {
            year,
            schedule_name: schedule.name().to_string(),
            entry_count: in_year.len(),
            total_gross,
            total_net,
            total_withheld,
            estimate,
            difference,
        }
    }

    pub fn settlement(&self) -> Settlement {
        Settlement::from_difference(self.difference)
    }

    /// True when the schedule was written for a different year than the entries.
    pub fn schedule_year_mismatch(
        &self,
        schedule: &TaxSchedule,
    ) -> bool {
        schedule.tax_year() != self.year
    }
}

/// Distinct years that have entries, newest first.
pub fn available_years(entries: &[SalaryEntry]) -> Vec<i32> {
    let years: BTreeSet<i32> = entries.iter().map(SalaryEntry::year).collect();
    years.into_iter().rev().collect()
}
