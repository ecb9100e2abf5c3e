use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// File formats understood by the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    Csv,
    Xml,
}

impl EntryFormat {
    /// Guesses the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for EntryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            other => Err(format!("unsupported format '{other}' (expected csv or xml)")),
        }
    }
}

impl fmt::Display for EntryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Xml => f.write_str("xml"),
        }
    }
}
