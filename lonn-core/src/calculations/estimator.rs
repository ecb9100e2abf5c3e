//! Progressive income-tax estimate over a marginal bracket table.
//!
//! For a gross income `g`, bracket *i* contributes
//! `rate_i * max(0, min(g, upper_i) - upper_{i-1})` with `upper_0 = 0`.
//! The total is the sum of all contributions.
//!
//! The total is rounded to whole kroner from the unrounded sum. Breakdown
//! lines are then apportioned by largest remainder: each bracket gets its
//! floored amount, and the kroner still missing go to the brackets with the
//! largest fractional parts, so the lines always add up to the total.
//! Brackets left with zero are not listed. Non-positive income yields a zero
//! result.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use lonn_core::TaxSchedule;
//! use lonn_core::calculations::TaxEstimator;
//!
//! let schedule = TaxSchedule::bracket_tax_2024();
//! let result = TaxEstimator::new(&schedule).estimate(dec!(300000));
//!
//! // 84 800 @ 1.7 % + 7 150 @ 4.0 %
//! assert_eq!(result.total_tax, dec!(1728));
//! assert_eq!(result.details.len(), 2);
//! ```

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::calculations::common::{format_amount, format_rate, max, round_to_unit};
use crate::{BracketContribution, TaxBracket, TaxCalculationResult, TaxSchedule};

/// Applies a [`TaxSchedule`] to gross income.
///
/// Holds only a borrowed schedule, so it is cheap to create per call and
/// safe to share between threads.
#[derive(Debug, Clone, Copy)]
pub struct TaxEstimator<'a> {
    schedule: &'a TaxSchedule,
}

impl<'a> TaxEstimator<'a> {
    pub fn new(schedule: &'a TaxSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &'a TaxSchedule {
        self.schedule
    }

    /// Estimates the tax liability for `gross_income`.
    ///
    /// Never fails: zero or negative income returns a zeroed result.
    pub fn estimate(
        &self,
        gross_income: Decimal,
    ) -> TaxCalculationResult {
        if gross_income <= Decimal::ZERO {
            debug!(%gross_income, schedule = self.schedule.name(), "non-positive income, no tax");
            return TaxCalculationResult::zero(gross_income);
        }

        let mut taxed = Vec::new();

        for (lower, bracket) in self.schedule.ranges() {
            if gross_income <= lower {
                break;
            }

            let amount = self.bracket_tax(gross_income, lower, bracket);
            trace!(%lower, rate = %bracket.rate, %amount, "bracket contribution");

            if amount > Decimal::ZERO {
                taxed.push((lower, bracket, amount));
            }
        }

        let total: Decimal = taxed.iter().map(|(_, _, amount)| *amount).sum();
        let total_tax = round_to_unit(total);
        let unrounded: Vec<Decimal> = taxed.iter().map(|(_, _, amount)| *amount).collect();
        let rounded = apportion(total_tax, &unrounded);

        let details = taxed
            .into_iter()
            .zip(rounded)
            .filter(|(_, amount)| !amount.is_zero())
            .map(|((lower, bracket, _), amount)| BracketContribution {
                label: bracket_label(lower, bracket),
                lower_bound: lower,
                upper_bound: bracket.upper_bound,
                rate: bracket.rate,
                amount,
            })
            .collect();
        debug!(
            %gross_income,
            %total_tax,
            schedule = self.schedule.name(),
            "estimated tax"
        );

        TaxCalculationResult {
            gross_income,
            total_tax,
            details,
        }
    }

    /// Portion of `gross_income` that falls inside the bracket.
    fn taxable_slice(
        &self,
        gross_income: Decimal,
        lower: Decimal,
        bracket: &TaxBracket,
    ) -> Decimal {
        let top = match bracket.upper_bound {
            Some(upper) => gross_income.min(upper),
            None => gross_income,
        };
        max(top - lower, Decimal::ZERO)
    }

    /// Unrounded tax for one bracket.
    fn bracket_tax(
        &self,
        gross_income: Decimal,
        lower: Decimal,
        bracket: &TaxBracket,
    ) -> Decimal {
        self.taxable_slice(gross_income, lower, bracket) * bracket.rate
    }
}

/// Rounds each of `amounts` (all positive) to whole units so that together
/// they equal `total`, which must be the rounded sum of `amounts`.
///
/// Ties between equal remainders go to the earlier bracket.
fn apportion(
    total: Decimal,
    amounts: &[Decimal],
) -> Vec<Decimal> {
    let mut rounded: Vec<Decimal> = amounts.iter().map(|a| a.floor()).collect();
    let mut missing = total - rounded.iter().copied().sum::<Decimal>();

    let mut order: Vec<usize> = (0..amounts.len()).collect();
    order.sort_by(|&a, &b| amounts[b].fract().cmp(&amounts[a].fract()));

    for index in order {
        if missing <= Decimal::ZERO {
            break;
        }
        rounded[index] += Decimal::ONE;
        missing -= Decimal::ONE;
    }
    rounded
}

fn bracket_label(
    lower: Decimal,
    bracket: &TaxBracket,
) -> String {
    match bracket.upper_bound {
        Some(upper) => format!(
            "{} - {} @ {}",
            format_amount(lower),
            format_amount(upper),
            format_rate(bracket.rate)
        ),
        None => format!("> {} @ {}", format_amount(lower), format_rate(bracket.rate)),
    }
}
