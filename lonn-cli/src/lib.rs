pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

use lonn_core::db::RepositoryRegistry;
use lonn_db_sqlite::SqliteRepositoryFactory;

use crate::cli::GlobalArgs;
use crate::config::{AppConfig, ConfigError};

/// Registry with every storage backend compiled into the binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Loads the config file named by `--config` (or the default one) and
/// applies the command-line overrides on top.
pub fn resolve_config(global: &GlobalArgs) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::load(global.config.as_deref())?;

    if let Some(backend) = &global.backend {
        config.database.backend = backend.clone();
    }
    if let Some(db) = &global.db {
        config.database.connection = db.clone();
    }
    if let Some(level) = &global.log_level {
        config.logging.level = level.clone();
    }
    if let Some(file) = &global.log_file {
        config.logging.file = Some(file.clone());
    }

    Ok(config)
}
