use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lonn_core::{NewSalaryEntry, RepositoryError, SalaryEntry, SalaryRepository};
use sqlx::{Row, sqlite::SqlitePool};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

const SELECT_ENTRY: &str = "SELECT id, entry_date, gross_salary, net_salary, tax_withheld,
        company_name, source_file, created_at, updated_at
 FROM salary_entries";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_salary_entry(row: &sqlx::sqlite::SqliteRow) -> Result<SalaryEntry, RepositoryError> {
    Ok(SalaryEntry {
        id: row.try_get("id").map_err(db_err)?,
        date: row
            .try_get::<NaiveDate, _>("entry_date")
            .map_err(|e| RepositoryError::Database(format!("Failed to get entry_date: {}", e)))?,
        gross_salary: get_decimal(row, "gross_salary")?,
        net_salary: get_decimal(row, "net_salary")?,
        tax_withheld: get_decimal(row, "tax_withheld")?,
        company_name: row.try_get("company_name").map_err(db_err)?,
        source_file: row.try_get("source_file").map_err(db_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl SalaryRepository for SqliteRepository {
    async fn create_entry(
        &self,
        entry: NewSalaryEntry,
    ) -> Result<SalaryEntry, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO salary_entries (
                entry_date, gross_salary, net_salary, tax_withheld,
                company_name, source_file, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.date)
        .bind(decimal_to_text(entry.gross_salary))
        .bind(decimal_to_text(entry.net_salary))
        .bind(decimal_to_text(entry.tax_withheld))
        .bind(&entry.company_name)
        .bind(&entry.source_file)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        debug!(id, date = %entry.date, "created salary entry");
        self.get_entry(id).await
    }

    async fn get_entry(
        &self,
        id: i64,
    ) -> Result<SalaryEntry, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ENTRY))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_salary_entry(&row)
    }

    async fn update_entry(
        &self,
        entry: &SalaryEntry,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE salary_entries SET
                entry_date = ?, gross_salary = ?, net_salary = ?, tax_withheld = ?,
                company_name = ?, source_file = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(entry.date)
        .bind(decimal_to_text(entry.gross_salary))
        .bind(decimal_to_text(entry.net_salary))
        .bind(decimal_to_text(entry.tax_withheld))
        .bind(&entry.company_name)
        .bind(&entry.source_file)
        .bind(now)
        .bind(entry.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id = entry.id, "updated salary entry");
        Ok(())
    }

    async fn delete_entry(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM salary_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id, "deleted salary entry");
        Ok(())
    }

    async fn list_entries(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<SalaryEntry>, RepositoryError> {
        let rows = match year {
            Some(year) => {
                sqlx::query(&format!(
                    "{} WHERE CAST(strftime('%Y', entry_date) AS INTEGER) = ?
                     ORDER BY entry_date DESC, id DESC",
                    SELECT_ENTRY
                ))
                .bind(year)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY entry_date DESC, id DESC", SELECT_ENTRY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_salary_entry).collect()
    }

    async fn list_years(&self) -> Result<Vec<i32>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT CAST(strftime('%Y', entry_date) AS INTEGER) AS year
             FROM salary_entries
             ORDER BY year DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("year").map_err(db_err))
            .map(|year| {
                year.and_then(|y| {
                    i32::try_from(y)
                        .map_err(|e| RepositoryError::Database(format!("Invalid year {}: {}", y, e)))
                })
            })
            .collect()
    }
}
