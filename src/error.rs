//! Error types for configuration and table storage.

use std::path::PathBuf;

/// Problems resolving or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No connection string in the config file or `TABLES_CONNECTION_STRING`.
    #[error("Missing TABLES_CONNECTION_STRING in environment variables")]
    MissingConnectionString,

    /// Table name fails the table-service naming rules.
    #[error("Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures reported by a table store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection string scheme has no matching backend.
    #[error("Unsupported connection string: {0}")]
    UnsupportedConnectionString(String),

    #[error("Failed to connect to table store: {0}")]
    Connect(#[source] sqlx::Error),

    /// Table creation failed for a reason other than the table existing.
    #[error("Failed to create table '{table}': {reason}")]
    CreateTable { table: String, reason: String },

    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    /// An entity with the same partition and row key is already stored.
    #[error("Entity already exists: PartitionKey='{partition_key}', RowKey='{row_key}'")]
    EntityAlreadyExists {
        partition_key: String,
        row_key: String,
    },

    #[error("Failed to serialize entity: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Table store query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for table store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
