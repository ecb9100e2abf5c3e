use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by [`NewSalaryEntry::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("tax withheld {withheld} exceeds gross salary {gross}")]
    WithheldExceedsGross { withheld: Decimal, gross: Decimal },

    #[error("net salary {net} exceeds gross salary {gross}")]
    NetExceedsGross { net: Decimal, gross: Decimal },
}

/// A recorded payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub gross_salary: Decimal,
    pub net_salary: Decimal,
    pub tax_withheld: Decimal,
    pub company_name: Option<String>,
    pub source_file: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new entries (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSalaryEntry {
    pub date: NaiveDate,
    pub gross_salary: Decimal,
    pub net_salary: Decimal,
    pub tax_withheld: Decimal,
    pub company_name: Option<String>,
    pub source_file: Option<String>,
}

impl SalaryEntry {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

impl NewSalaryEntry {
    pub fn new(
        date: NaiveDate,
        gross_salary: Decimal,
        net_salary: Decimal,
        tax_withheld: Decimal,
    ) -> Self {
        Self {
            date,
            gross_salary,
            net_salary,
            tax_withheld,
            company_name: None,
            source_file: None,
        }
    }

    pub fn with_company(
        mut self,
        company_name: impl Into<String>,
    ) -> Self {
        self.company_name = normalize_optional(Some(company_name.into()));
        self
    }

    pub fn with_source_file(
        mut self,
        source_file: impl Into<String>,
    ) -> Self {
        self.source_file = normalize_optional(Some(source_file.into()));
        self
    }

    /// Trims optional text fields and turns blank ones into `None`.
    pub fn normalized(mut self) -> Self {
        self.company_name = normalize_optional(self.company_name);
        self.source_file = normalize_optional(self.source_file);
        self
    }

    pub fn validate(&self) -> Result<(), EntryError> {
        for (field, value) in [
            ("gross salary", self.gross_salary),
            ("net salary", self.net_salary),
            ("tax withheld", self.tax_withheld),
        ] {
            if value < Decimal::ZERO {
                return Err(EntryError::NegativeAmount { field, value });
            }
        }

        if self.tax_withheld > self.gross_salary {
            return Err(EntryError::WithheldExceedsGross {
                withheld: self.tax_withheld,
                gross: self.gross_salary,
            });
        }

        if self.net_salary > self.gross_salary {
            return Err(EntryError::NetExceedsGross {
                net: self.net_salary,
                gross: self.gross_salary,
            });
        }

        Ok(())
    }
}

impl From<&SalaryEntry> for NewSalaryEntry {
    fn from(entry: &SalaryEntry) -> Self {
        Self {
            date: entry.date,
            gross_salary: entry.gross_salary,
            net_salary: entry.net_salary,
            tax_withheld: entry.tax_withheld,
            company_name: entry.company_name.clone(),
            source_file: entry.source_file.clone(),
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
