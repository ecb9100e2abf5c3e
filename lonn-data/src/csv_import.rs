//! CSV reader for salary entries.
//!
//! | Column         | Required | Notes                                   |
//! |----------------|----------|-----------------------------------------|
//! | `date`         | yes      | `YYYY-MM-DD`                            |
//! | `gross_salary` | yes      | decimal, `,`/space thousands separators |
//! | `net_salary`   | yes      | decimal                                 |
//! | `tax_withheld` | yes      | decimal                                 |
//! | `company_name` | no       | column may be empty or missing          |
//! | `source_file`  | no       | column may be empty or missing          |
//!
//! ```csv
//! date,gross_salary,net_salary,tax_withheld,company_name
//! 2024-01-25,52345.67,38000.17,14345.50,Acme AS
//! ```

use std::io::Read;

use lonn_core::NewSalaryEntry;
use serde::Deserialize;
use tracing::debug;

use crate::ImportError;
use crate::parse::RawEntry;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    gross_salary: String,
    net_salary: String,
    tax_withheld: String,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    source_file: Option<String>,
}

impl From<CsvRow> for RawEntry {
    fn from(row: CsvRow) -> Self {
        RawEntry {
            date: row.date,
            gross_salary: row.gross_salary,
            net_salary: row.net_salary,
            tax_withheld: row.tax_withheld,
            company_name: row.company_name,
            source_file: row.source_file,
        }
    }
}

pub struct CsvEntryReader;

impl CsvEntryReader {
    /// Parses every row; the first invalid row aborts the whole read.
    pub fn read<R: Read>(reader: R) -> Result<Vec<NewSalaryEntry>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = Vec::new();

        for (index, result) in csv_reader.deserialize::<CsvRow>().enumerate() {
            let row = result?;
            entries.push(RawEntry::from(row).into_new_entry(index + 1)?);
        }

        debug!(count = entries.len(), "parsed csv entries");
        Ok(entries)
    }
}
