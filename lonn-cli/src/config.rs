//! `lonn.toml` configuration.
//!
//! Every section is optional; missing keys fall back to [`AppConfig::default`].
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection = "lonn.db"
//!
//! [tax]
//! schedule = "trinnskatt-2024"
//!
//! [[tax.custom_schedules]]
//! name = "my-2025"
//! tax_year = 2025
//! brackets = [ { upper_bound = "100000", rate = "0" }, { rate = "0.3" } ]
//!
//! [logging]
//! level = "info"
//! file = "lonn.log"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lonn_core::db::DbConfig;
use lonn_core::{ScheduleError, TaxSchedule};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "lonn.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("schedule name '{0}' is defined more than once")]
    DuplicateSchedule(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub backend: String,
    pub connection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection: "lonn.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxConfig {
    /// Schedule used when a command does not name one.
    pub schedule: String,
    /// Extra named tables; validated while the file is parsed.
    pub custom_schedules: Vec<TaxSchedule>,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            schedule: TaxSchedule::BRACKET_TAX_2024.to_string(),
            custom_schedules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Bare level or any `EnvFilter` directive.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub tax: TaxConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`]
    /// in the working directory is read if present, otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let config = Self::from_toml(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.check_schedule_names()?;
        config.schedule(None)?;
        Ok(config)
    }

    fn check_schedule_names(&self) -> Result<(), ConfigError> {
        let mut seen: Vec<&str> = TaxSchedule::builtin_names();
        for schedule in &self.tax.custom_schedules {
            if seen.contains(&schedule.name()) {
                return Err(ConfigError::DuplicateSchedule(schedule.name().to_string()));
            }
            seen.push(schedule.name());
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection.clone(),
        }
    }

    /// Built-in schedules followed by the custom ones.
    pub fn schedules(&self) -> Vec<TaxSchedule> {
        let mut all = TaxSchedule::builtin();
        all.extend(self.tax.custom_schedules.iter().cloned());
        all
    }

    /// Resolves `name`, or the configured default when `None`.
    pub fn schedule(
        &self,
        name: Option<&str>,
    ) -> Result<TaxSchedule, ScheduleError> {
        let name = name.unwrap_or(&self.tax.schedule);
        let all = self.schedules();

        match all.iter().find(|s| s.name() == name) {
            Some(schedule) => Ok(schedule.clone()),
            None => Err(ScheduleError::UnknownSchedule {
                name: name.to_string(),
                available: all.iter().map(|s| s.name().to_string()).collect(),
            }),
        }
    }
}
