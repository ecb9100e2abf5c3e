use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewSalaryEntry, SalaryEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for recorded payslips.
///
/// Listing order is date descending, then id descending, so the newest
/// payslip comes first.
#[async_trait]
pub trait SalaryRepository: Send + Sync {
    async fn create_entry(
        &self,
        entry: NewSalaryEntry,
    ) -> Result<SalaryEntry, RepositoryError>;

    async fn get_entry(&self, id: i64) -> Result<SalaryEntry, RepositoryError>;

    async fn update_entry(&self, entry: &SalaryEntry) -> Result<(), RepositoryError>;

    async fn delete_entry(&self, id: i64) -> Result<(), RepositoryError>;

    async fn list_entries(&self, year: Option<i32>) -> Result<Vec<SalaryEntry>, RepositoryError>;

    /// Distinct years with at least one entry, newest first.
    async fn list_years(&self) -> Result<Vec<i32>, RepositoryError>;
}
