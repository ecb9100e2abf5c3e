use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaxBracket;

/// Errors raised when a bracket table does not describe a valid marginal schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule '{0}' has no brackets")]
    NoBrackets(String),

    #[error("bracket {index} upper bound {bound} must be positive")]
    NonPositiveBound { index: usize, bound: Decimal },

    #[error("bracket {index} upper bound {bound} does not exceed previous bound {previous}")]
    BoundsNotIncreasing {
        index: usize,
        bound: Decimal,
        previous: Decimal,
    },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeLast(usize),

    #[error("last bracket must be unbounded")]
    LastBracketBounded,

    #[error("bracket {index} rate {rate} must be between 0 and 1")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("unknown tax schedule '{name}'; available: {available:?}")]
    UnknownSchedule {
        name: String,
        available: Vec<String>,
    },
}

/// An immutable marginal bracket table for a single tax year.
///
/// Instances are only built through [`TaxSchedule::new`] (or serde, which
/// routes through it), so every schedule in circulation covers `(0, ∞)`
/// with strictly increasing bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedSchedule")]
pub struct TaxSchedule {
    name: String,
    tax_year: i32,
    brackets: Vec<TaxBracket>,
}

#[derive(Deserialize)]
struct UncheckedSchedule {
    name: String,
    tax_year: i32,
    brackets: Vec<TaxBracket>,
}

impl TryFrom<UncheckedSchedule> for TaxSchedule {
    type Error = ScheduleError;

    fn try_from(raw: UncheckedSchedule) -> Result<Self, Self::Error> {
        TaxSchedule::new(raw.name, raw.tax_year, raw.brackets)
    }
}

impl TaxSchedule {
    pub const BRACKET_TAX_2024: &'static str = "trinnskatt-2024";
    pub const COMBINED_MARGINAL_2024: &'static str = "combined-2024";

    pub fn new(
        name: impl Into<String>,
        tax_year: i32,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, ScheduleError> {
        let name = name.into();
        validate_brackets(&name, &brackets)?;
        Ok(Self {
            name,
            tax_year,
            brackets,
        })
    }

    /// Progressive bracket tax ("trinnskatt") as recorded for 2024.
    pub fn bracket_tax_2024() -> Self {
        Self {
            name: Self::BRACKET_TAX_2024.to_string(),
            tax_year: 2024,
            brackets: vec![
                TaxBracket::bounded(dec!(208050), dec!(0)),
                TaxBracket::bounded(dec!(292850), dec!(0.017)),
                TaxBracket::bounded(dec!(670000), dec!(0.040)),
                TaxBracket::bounded(dec!(937900), dec!(0.136)),
                TaxBracket::bounded(dec!(1350000), dec!(0.176)),
                TaxBracket::unbounded(dec!(0.178)),
            ],
        }
    }

    /// Flat marginal table for 2024 where social security (7.8 %) and the
    /// general income tax (22 %) are folded into each bracket's rate, with the
    /// personal allowance as a zero-rate first bracket.
    pub fn combined_marginal_2024() -> Self {
        Self {
            name: Self::COMBINED_MARGINAL_2024.to_string(),
            tax_year: 2024,
            brackets: vec![
                TaxBracket::bounded(dec!(88250), dec!(0)),
                TaxBracket::bounded(dec!(208050), dec!(0.298)),
                TaxBracket::bounded(dec!(292850), dec!(0.315)),
                TaxBracket::bounded(dec!(670000), dec!(0.338)),
                TaxBracket::bounded(dec!(937900), dec!(0.434)),
                TaxBracket::bounded(dec!(1350000), dec!(0.474)),
                TaxBracket::unbounded(dec!(0.476)),
            ],
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![Self::bracket_tax_2024(), Self::combined_marginal_2024()]
    }

    pub fn builtin_names() -> Vec<&'static str> {
        vec![Self::BRACKET_TAX_2024, Self::COMBINED_MARGINAL_2024]
    }

    /// Looks up a built-in schedule by name.
    pub fn by_name(name: &str) -> Result<Self, ScheduleError> {
        Self::builtin()
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ScheduleError::UnknownSchedule {
                name: name.to_string(),
                available: Self::builtin_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Iterates brackets together with their implied lower bound.
    pub fn ranges(&self) -> impl Iterator<Item = (Decimal, &TaxBracket)> {
        let lowers = std::iter::once(Decimal::ZERO).chain(
            self.brackets
                .iter()
                .filter_map(|b| b.upper_bound),
        );
        lowers.zip(self.brackets.iter())
    }
}

fn validate_brackets(
    name: &str,
    brackets: &[TaxBracket],
) -> Result<(), ScheduleError> {
    if brackets.is_empty() {
        return Err(ScheduleError::NoBrackets(name.to_string()));
    }

    let last = brackets.len() - 1;
    let mut previous = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(ScheduleError::InvalidRate {
                index,
                rate: bracket.rate,
            });
        }

        match bracket.upper_bound {
            Some(_) if index == last => return Err(ScheduleError::LastBracketBounded),
            Some(bound) if bound <= Decimal::ZERO => {
                return Err(ScheduleError::NonPositiveBound { index, bound });
            }
            Some(bound) if bound <= previous => {
                return Err(ScheduleError::BoundsNotIncreasing {
                    index,
                    bound,
                    previous,
                });
            }
            Some(bound) => previous = bound,
            None if index != last => return Err(ScheduleError::UnboundedBeforeLast(index)),
            None => {}
        }
    }

    Ok(())
}
