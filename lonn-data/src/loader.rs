use lonn_core::{NewSalaryEntry, SalaryEntry, SalaryRepository};
use tracing::{debug, info};

use crate::ImportError;

/// Outcome of [`EntryLoader::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    /// Entries already present in the repository, left untouched.
    pub skipped: usize,
}

/// Writes parsed entries into any [`SalaryRepository`] backend.
pub struct EntryLoader;

impl EntryLoader {
    /// Insert `entries` through the repository.
    ///
    /// An entry that matches a stored one on date, amounts and company is
    /// skipped, so loading the same file twice does not duplicate payslips.
    /// Duplicates within `entries` itself are collapsed the same way.
    pub async fn load<R: SalaryRepository + ?Sized>(
        repo: &R,
        entries: &[NewSalaryEntry],
    ) -> Result<LoadReport, ImportError> {
        let mut known: Vec<NewSalaryEntry> = repo
            .list_entries(None)
            .await?
            .iter()
            .map(NewSalaryEntry::from)
            .collect();

        let mut report = LoadReport::default();

        for entry in entries {
            if known.iter().any(|k| same_payslip(k, entry)) {
                debug!(date = %entry.date, gross = %entry.gross_salary, "skipping duplicate entry");
                report.skipped += 1;
                continue;
            }

            let created: SalaryEntry = repo.create_entry(entry.clone()).await?;
            debug!(id = created.id, date = %created.date, "inserted entry");
            known.push(entry.clone());
            report.inserted += 1;
        }

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "loaded salary entries"
        );
        Ok(report)
    }
}

fn same_payslip(
    a: &NewSalaryEntry,
    b: &NewSalaryEntry,
) -> bool {
    a.date == b.date
        && a.gross_salary == b.gross_salary
        && a.net_salary == b.net_salary
        && a.tax_withheld == b.tax_withheld
        && a.company_name == b.company_name
}
