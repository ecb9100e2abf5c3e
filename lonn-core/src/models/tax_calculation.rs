use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax attributed to a single bracket of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketContribution {
    /// Human readable range and rate, e.g. `208 050 - 292 850 @ 1.7 %`.
    pub label: String,
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    /// Tax from this bracket, rounded to whole currency units.
    pub amount: Decimal,
}

/// Output of the tax estimator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub gross_income: Decimal,
    /// Estimated liability, rounded to whole currency units.
    pub total_tax: Decimal,
    /// Brackets that contributed tax, lowest first.
    pub details: Vec<BracketContribution>,
}

impl TaxCalculationResult {
    pub fn zero(gross_income: Decimal) -> Self {
        Self {
            gross_income,
            total_tax: Decimal::ZERO,
            details: Vec::new(),
        }
    }

    pub fn details_total(&self) -> Decimal {
        self.details.iter().map(|d| d.amount).sum()
    }

    /// Total tax as a share of gross income, or `None` without positive income.
    pub fn effective_rate(&self) -> Option<Decimal> {
        if self.gross_income <= Decimal::ZERO {
            return None;
        }
        self.total_tax.checked_div(self.gross_income)
    }
}
