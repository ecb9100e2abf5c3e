use async_trait::async_trait;
use tracing::info;

use lonn_core::db::repository::{RepositoryError, SalaryRepository};
use lonn_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Turns the user-facing connection string into a sqlx URL.
///
/// * `:memory:` becomes an ephemeral in-memory database.
/// * Anything already starting with `sqlite:` is passed through.
/// * Any other value is a file path, created if missing.
fn database_url(connection_string: &str) -> String {
    match connection_string.trim() {
        ":memory:" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite:{}?mode=rwc", path),
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use lonn_core::db::RepositoryRegistry;
/// use lonn_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and run
    /// the embedded migrations.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SalaryRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        info!(%url, "opening sqlite database");

        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}
