use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{RepositoryError, SalaryRepository};

/// Where payslips are stored: which backend, and how to reach it.
///
/// `connection_string` is interpreted by the backend alone. For `sqlite` it
/// is a file path such as `lonn.db`, the literal `:memory:`, or a
/// `sqlite:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens a [`SalaryRepository`] for one storage backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Name selected by `DbConfig::backend` and the `--backend` flag.
    fn backend_name(&self) -> &'static str;

    /// Returns a repository whose schema is already up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SalaryRepository>, RepositoryError>;
}

/// Backends known to the binary, looked up by [`DbConfig::backend`].
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Adds a backend. A later factory with the same name wins.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the repository configured in `config`.
    ///
    /// Fails with [`RepositoryError::Configuration`] for a backend nobody
    /// registered; errors from the backend itself pass through unchanged.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SalaryRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        debug!(backend = %config.backend, "opening salary repository");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{NewSalaryEntry, SalaryEntry};

    /// Repository that only knows which years it holds.
    struct YearsOnly(Vec<i32>);

    #[async_trait]
    impl SalaryRepository for YearsOnly {
        async fn create_entry(
            &self,
            _entry: NewSalaryEntry,
        ) -> Result<SalaryEntry, RepositoryError> {
            Err(RepositoryError::Database("read-only".to_string()))
        }
        async fn get_entry(&self, _id: i64) -> Result<SalaryEntry, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn update_entry(&self, _entry: &SalaryEntry) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn delete_entry(&self, _id: i64) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_entries(
            &self,
            _year: Option<i32>,
        ) -> Result<Vec<SalaryEntry>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn list_years(&self) -> Result<Vec<i32>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    /// Opens a [`YearsOnly`] repository holding `years`.
    struct YearsBackend {
        name: &'static str,
        years: Vec<i32>,
    }

    #[async_trait]
    impl RepositoryFactory for YearsBackend {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn SalaryRepository>, RepositoryError> {
            Ok(Box::new(YearsOnly(self.years.clone())))
        }
    }

    /// Refuses every connection, naming the connection string it was given.
    struct Unreachable;

    #[async_trait]
    impl RepositoryFactory for Unreachable {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
        async fn create(
            &self,
            config: &DbConfig,
        ) -> Result<Box<dyn SalaryRepository>, RepositoryError> {
            Err(RepositoryError::Connection(format!(
                "cannot reach {}",
                config.connection_string
            )))
        }
    }

    fn backend(
        name: &'static str,
        years: &[i32],
    ) -> Box<dyn RepositoryFactory> {
        Box::new(YearsBackend {
            name,
            years: years.to_vec(),
        })
    }

    fn db(
        backend: &str,
        connection_string: &str,
    ) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: connection_string.to_string(),
        }
    }

    #[test]
    fn default_config_is_in_memory_sqlite() {
        assert_eq!(DbConfig::default(), db("sqlite", ":memory:"));
    }

    #[test]
    fn backends_are_listed_alphabetically() {
        let mut registry = RepositoryRegistry::default();
        assert!(registry.available_backends().is_empty());

        registry.register(backend("sqlite", &[]));
        registry.register(backend("archive", &[]));

        assert_eq!(registry.available_backends(), vec!["archive", "sqlite"]);
    }

    #[tokio::test]
    async fn config_selects_backend_by_name() {
        let mut registry = RepositoryRegistry::new();
        registry.register(backend("sqlite", &[2024]));
        registry.register(backend("archive", &[2019, 2018]));

        let repo = registry.create(&db("archive", "old.db")).await.unwrap();

        assert_eq!(repo.list_years().await, Ok(vec![2019, 2018]));
    }

    #[tokio::test]
    async fn registering_same_name_again_replaces_backend() {
        let mut registry = RepositoryRegistry::new();
        registry.register(backend("sqlite", &[2023]));
        registry.register(backend("sqlite", &[2024]));

        let repo = registry.create(&db("sqlite", ":memory:")).await.unwrap();

        assert_eq!(registry.available_backends(), vec!["sqlite"]);
        assert_eq!(repo.list_years().await, Ok(vec![2024]));
    }

    #[tokio::test]
    async fn unknown_backend_lists_registered_ones() {
        let mut registry = RepositoryRegistry::new();
        registry.register(backend("sqlite", &[]));

        let err = registry.create(&db("postgres", "host=db")).await.err();

        assert_eq!(
            err,
            Some(RepositoryError::Configuration(
                "unknown backend 'postgres'; available: [\"sqlite\"]".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn backend_failure_is_returned_as_is() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(Unreachable));

        let err = registry.create(&db("unreachable", "/mnt/payslips.db")).await.err();

        assert_eq!(
            err,
            Some(RepositoryError::Connection("cannot reach /mnt/payslips.db".to_string()))
        );
    }
}
