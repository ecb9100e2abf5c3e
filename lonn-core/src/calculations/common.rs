//! Common utility functions for tax calculations.
//!
//! Rounding and display helpers shared by the estimator, the yearly summary
//! and the CLI report.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to whole currency units (kroner), midpoint away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use lonn_core::calculations::common::round_to_unit;
///
/// assert_eq!(round_to_unit(dec!(1441.6)), dec!(1442));
/// assert_eq!(round_to_unit(dec!(1441.5)), dec!(1442));
/// assert_eq!(round_to_unit(dec!(1441.49)), dec!(1441));
/// assert_eq!(round_to_unit(dec!(-0.5)), dec!(-1));
/// ```
pub fn round_to_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to exactly two decimal places (øre) using half-up rounding.
///
/// ```
/// use rust_decimal_macros::dec;
/// use lonn_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Formats an amount with a space as thousands separator, e.g. `1 350 000`.
///
/// Fractional digits are kept as-is after normalization.
///
/// ```
/// use rust_decimal_macros::dec;
/// use lonn_core::calculations::common::format_amount;
///
/// assert_eq!(format_amount(dec!(1350000)), "1 350 000");
/// assert_eq!(format_amount(dec!(-2500.50)), "-2 500.5");
/// ```
pub fn format_amount(value: Decimal) -> String {
    group_thousands(&value.normalize().to_string())
}

/// Formats a money amount with exactly two decimals (øre), grouped like
/// [`format_amount`].
///
/// ```
/// use rust_decimal_macros::dec;
/// use lonn_core::calculations::common::format_money;
///
/// assert_eq!(format_money(dec!(52345.6)), "52 345.60");
/// assert_eq!(format_money(dec!(-0.005)), "-0.01");
/// ```
pub fn format_money(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);
    group_thousands(&rounded.to_string())
}

fn group_thousands(text: &str) -> String {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats a fractional rate as a percentage, e.g. `0.017` as `1.7 %`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{} %", (rate * Decimal::ONE_HUNDRED).normalize())
}
