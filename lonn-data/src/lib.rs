//! Import and export of salary entries.
//!
//! CSV and XML files are parsed into validated [`NewSalaryEntry`] values,
//! which [`EntryLoader`] then writes through any [`SalaryRepository`].
//!
//! [`NewSalaryEntry`]: lonn_core::NewSalaryEntry
//! [`SalaryRepository`]: lonn_core::SalaryRepository

mod csv_import;
mod error;
mod format;
mod loader;
mod parse;
mod xml;

pub use csv_import::CsvEntryReader;
pub use error::{AmountError, ExportError, ImportError};
pub use format::EntryFormat;
pub use loader::{EntryLoader, LoadReport};
pub use parse::{parse_amount, parse_date};
pub use xml::{XmlEntryReader, XmlEntryWriter};
