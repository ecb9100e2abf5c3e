use chrono::NaiveDate;
use lonn_core::NewSalaryEntry;
use rust_decimal::Decimal;

use crate::{AmountError, ImportError};

/// Text fields of one imported record, before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawEntry {
    pub date: String,
    pub gross_salary: String,
    pub net_salary: String,
    pub tax_withheld: String,
    pub company_name: Option<String>,
    pub source_file: Option<String>,
}

impl RawEntry {
    /// Parses and validates the record; `record` is its 1-based position.
    pub fn into_new_entry(
        self,
        record: usize,
    ) -> Result<NewSalaryEntry, ImportError> {
        let date = parse_date(&self.date).map_err(|_| ImportError::InvalidDate {
            record,
            value: self.date.clone(),
        })?;

        let amount = |field: &'static str, value: &str| {
            parse_amount(value).map_err(|_| ImportError::InvalidAmount {
                record,
                field,
                value: value.to_string(),
            })
        };

        let entry = NewSalaryEntry {
            date,
            gross_salary: amount("gross salary", &self.gross_salary)?,
            net_salary: amount("net salary", &self.net_salary)?,
            tax_withheld: amount("tax withheld", &self.tax_withheld)?,
            company_name: self.company_name,
            source_file: self.source_file,
        }
        .normalized();

        entry
            .validate()
            .map_err(|source| ImportError::InvalidEntry { record, source })?;

        Ok(entry)
    }
}

/// Parses a money amount.
///
/// Whitespace is ignored anywhere in the text (`"52 345.67"`). A comma is
/// accepted in two places only: between groups of three digits in the
/// integer part (`"1,234.56"`), or, when there is no `.`, as a decimal comma
/// followed by exactly two digits (`"52 345,67"`). Empty input is zero.
pub fn parse_amount(s: &str) -> Result<Decimal, AmountError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let plain = without_commas(&compact).ok_or(AmountError::Separator)?;
    Ok(plain.parse()?)
}

/// Rewrites `compact` in `1234.56` notation, or `None` for a comma that is
/// neither a thousands separator nor a decimal comma.
fn without_commas(compact: &str) -> Option<String> {
    if !compact.contains(',') {
        return Some(compact.to_string());
    }

    if !compact.contains('.') {
        if let Some((whole, cents)) = compact.split_once(',') {
            let digits = whole.strip_prefix('-').unwrap_or(whole);
            if cents.len() == 2 && is_digits(cents) && !digits.is_empty() && is_digits(digits) {
                return Some(format!("{whole}.{cents}"));
            }
        }
    }

    let (integer, fraction) = match compact.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (compact, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };
    let mut groups = digits.split(',');
    let leading = groups.next()?;
    if !(1..=3).contains(&leading.len()) || !is_digits(leading) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && is_digits(g)) {
        return None;
    }

    let mut plain = format!("{sign}{}", digits.replace(',', ""));
    if let Some(fraction) = fraction {
        plain.push('.');
        plain.push_str(fraction);
    }
    Some(plain)
}

fn is_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}
