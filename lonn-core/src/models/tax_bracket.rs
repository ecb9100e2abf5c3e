use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One slice of a marginal schedule.
///
/// The lower bound is implied by the previous bracket's `upper_bound`
/// (zero for the first bracket). `None` marks the unbounded top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub const fn bounded(upper_bound: Decimal, rate: Decimal) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub const fn unbounded(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}
