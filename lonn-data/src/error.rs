use lonn_core::{EntryError, RepositoryError};
use thiserror::Error;

/// Errors that can occur while reading or loading salary entries.
///
/// `record` is the 1-based position of the offending entry in the file
/// (data rows for CSV, `<entry>` elements for XML).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV parse error: {0}")]
    Csv(String),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("record {record}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { record: usize, value: String },

    #[error("record {record}: invalid {field} '{value}'")]
    InvalidAmount {
        record: usize,
        field: &'static str,
        value: String,
    },

    #[error("record {record}: {source}")]
    InvalidEntry {
        record: usize,
        #[source]
        source: EntryError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Csv(err.to_string())
    }
}

impl From<quick_xml::DeError> for ImportError {
    fn from(err: quick_xml::DeError) -> Self {
        ImportError::Xml(err.to_string())
    }
}

/// Why a money amount could not be read.
#[derive(Debug, Error)]
pub enum AmountError {
    #[error("a comma must separate thousands or precede exactly two decimals")]
    Separator,

    #[error(transparent)]
    Decimal(#[from] rust_decimal::Error),
}

/// Errors that can occur while writing salary entries.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XML write error: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
