//! Configuration loading.
//!
//! Settings come from an optional TOML file, then environment variables
//! override them:
//!
//! | Variable | Overrides | Default |
//! |----------|-----------|---------|
//! | `TABLES_CONNECTION_STRING` | `[store].connection_string` | none (required) |
//! | `TABLE_NAME` | `[store].table_name` | `TextAnalysisResults` |
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:7071"
//!
//! [store]
//! connection_string = "sqlite:./data/analyzer.sqlite"
//! table_name = "TextAnalysisResults"
//! ```
//!
//! The connection string is only checked when a store is opened, so a
//! missing value does not stop `analyze` from running offline.

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

pub const CONNECTION_STRING_ENV: &str = "TABLES_CONNECTION_STRING";
pub const TABLE_NAME_ENV: &str = "TABLE_NAME";
pub const DEFAULT_TABLE_NAME: &str = "TextAnalysisResults";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7071".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
}

/// Validated store settings, ready to open a table with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub connection_string: String,
    pub table_name: String,
}

impl StoreConfig {
    /// Resolve the connection string and table name, applying the default
    /// table name and validating it.
    pub fn resolve(&self) -> Result<StoreSettings, ConfigError> {
        let connection_string = self
            .connection_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingConnectionString)?
            .to_string();

        let table_name = self
            .table_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TABLE_NAME)
            .to_string();
        validate_table_name(&table_name)?;

        Ok(StoreSettings {
            connection_string,
            table_name,
        })
    }
}

impl Config {
    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(conn) = lookup(CONNECTION_STRING_ENV) {
            self.store.connection_string = Some(conn);
        }
        if let Some(name) = lookup(TABLE_NAME_ENV) {
            self.store.table_name = Some(name);
        }
    }
}

/// Load configuration from `path` (if given) and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => Config::default(),
    };

    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

/// Table names are 3-63 ASCII alphanumerics starting with a letter, and
/// may not be the reserved name `tables`.
pub fn validate_table_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidTableName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if !(3..=63).contains(&name.len()) {
        return Err(invalid("must be between 3 and 63 characters long"));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("must start with a letter"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("may only contain letters and digits"));
    }
    if name.eq_ignore_ascii_case("tables") {
        return Err(invalid("'tables' is reserved"));
    }
    Ok(())
}
