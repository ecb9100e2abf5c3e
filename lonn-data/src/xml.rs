//! XML backup format for salary entries.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <salaryEntries>
//!   <entry>
//!     <date>2024-01-25</date>
//!     <grossSalary>52345.67</grossSalary>
//!     <netSalary>38000.17</netSalary>
//!     <taxWithheld>14345.5</taxWithheld>
//!     <companyName>Acme AS</companyName>
//!     <sourceFile>januar.pdf</sourceFile>
//!   </entry>
//! </salaryEntries>
//! ```
//!
//! `companyName` and `sourceFile` are optional and omitted on export when unset.

use std::io::{Read, Write};

use lonn_core::{NewSalaryEntry, SalaryEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parse::RawEntry;
use crate::{ExportError, ImportError};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "salaryEntries")]
struct XmlDocument {
    #[serde(rename = "entry", default)]
    entries: Vec<XmlEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XmlEntry {
    date: String,
    gross_salary: String,
    net_salary: String,
    tax_withheld: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_file: Option<String>,
}

impl From<XmlEntry> for RawEntry {
    fn from(entry: XmlEntry) -> Self {
        RawEntry {
            date: entry.date,
            gross_salary: entry.gross_salary,
            net_salary: entry.net_salary,
            tax_withheld: entry.tax_withheld,
            company_name: entry.company_name,
            source_file: entry.source_file,
        }
    }
}

impl From<&SalaryEntry> for XmlEntry {
    fn from(entry: &SalaryEntry) -> Self {
        XmlEntry {
            date: entry.date.format("%Y-%m-%d").to_string(),
            gross_salary: entry.gross_salary.normalize().to_string(),
            net_salary: entry.net_salary.normalize().to_string(),
            tax_withheld: entry.tax_withheld.normalize().to_string(),
            company_name: entry.company_name.clone(),
            source_file: entry.source_file.clone(),
        }
    }
}

pub struct XmlEntryReader;

impl XmlEntryReader {
    /// Parses a `<salaryEntries>` document; the first invalid entry aborts the read.
    pub fn read<R: Read>(mut reader: R) -> Result<Vec<NewSalaryEntry>, ImportError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::read_str(&text)
    }

    pub fn read_str(text: &str) -> Result<Vec<NewSalaryEntry>, ImportError> {
        let document: XmlDocument = quick_xml::de::from_str(text)?;

        let entries = document
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| RawEntry::from(entry).into_new_entry(index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = entries.len(), "parsed xml entries");
        Ok(entries)
    }
}

pub struct XmlEntryWriter;

impl XmlEntryWriter {
    /// Writes `entries` as an indented XML document, in the order given.
    pub fn write<W: Write>(
        mut writer: W,
        entries: &[SalaryEntry],
    ) -> Result<(), ExportError> {
        let text = Self::to_string(entries)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_string(entries: &[SalaryEntry]) -> Result<String, ExportError> {
        let document = XmlDocument {
            entries: entries.iter().map(XmlEntry::from).collect(),
        };

        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        document
            .serialize(serializer)
            .map_err(|e| ExportError::Xml(e.to_string()))?;

        debug!(count = entries.len(), "serialized xml entries");
        Ok(format!("{XML_DECLARATION}\n{body}\n"))
    }
}
