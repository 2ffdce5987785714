//! Table storage abstraction.
//!
//! The [`TableStore`] trait is the flat, schemaless table the analyzer
//! writes records into: every row carries a partition key and a row key
//! plus a handful of string columns (see [`TableEntity`]).
//!
//! [`open_table`] is the store accessor. It picks a backend from the
//! connection string scheme and makes sure the named table exists:
//!
//! | Scheme | Backend |
//! |--------|---------|
//! | `sqlite:` | [`SqliteTableStore`], one SQLite table per store table |
//! | `memory:` | [`InMemoryTableStore`], process-local and non-durable |
//!
//! Handles are built once per process and shared as `Arc<dyn TableStore>`.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StoreSettings};
use crate::error::{StoreError, StoreResult};
use crate::models::TableEntity;

pub use memory::InMemoryTableStore;
pub use sqlite::SqliteTableStore;

/// Outcome of [`TableStore::create_table_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCreation {
    Created,
    AlreadyExists,
}

/// Abstract table backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create_table_if_absent`](TableStore::create_table_if_absent) | Idempotent table creation |
/// | [`insert_entity`](TableStore::insert_entity) | Append one entity; duplicates are rejected |
/// | [`query_partition`](TableStore::query_partition) | One page of entities from a partition |
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Name of the table this handle points at.
    fn table_name(&self) -> &str;

    /// Create the table unless it already exists.
    ///
    /// An existing table is not an error. Any other failure is returned as
    /// [`StoreError::CreateTable`].
    async fn create_table_if_absent(&self) -> StoreResult<TableCreation>;

    /// Insert a new entity. Fails with [`StoreError::EntityAlreadyExists`]
    /// when the partition/row key pair is taken.
    async fn insert_entity(&self, entity: &TableEntity) -> StoreResult<()>;

    /// Fetch up to `results_per_page` entities from one partition, in the
    /// store's native order.
    async fn query_partition(
        &self,
        partition_key: &str,
        results_per_page: usize,
    ) -> StoreResult<Vec<TableEntity>>;
}

/// Build a handle for the backend named by the connection string scheme.
/// Does not touch the table itself.
pub async fn connect_table(settings: &StoreSettings) -> StoreResult<Arc<dyn TableStore>> {
    let conn = settings.connection_string.as_str();

    if conn.starts_with("sqlite:") {
        Ok(Arc::new(
            SqliteTableStore::connect(conn, &settings.table_name).await?,
        ))
    } else if conn.starts_with("memory:") {
        Ok(Arc::new(InMemoryTableStore::new(&settings.table_name)))
    } else {
        // Never echo the string itself, it may carry account keys
        Err(StoreError::UnsupportedConnectionString(
            "expected a sqlite: or memory: URL".to_string(),
        ))
    }
}

/// Open the configured table, creating it if needed.
pub async fn open_table(settings: &StoreSettings) -> StoreResult<Arc<dyn TableStore>> {
    let store = connect_table(settings).await?;

    match store.create_table_if_absent().await? {
        TableCreation::Created => tracing::info!(table = %store.table_name(), "Created table"),
        TableCreation::AlreadyExists => {
            tracing::debug!(table = %store.table_name(), "Table already exists")
        }
    }

    Ok(store)
}

/// `init` command: make sure the configured table exists.
pub async fn run_init(config: &Config) -> anyhow::Result<()> {
    let settings = config.store.resolve()?;
    let store = connect_table(&settings).await?;

    match store.create_table_if_absent().await? {
        TableCreation::Created => println!("Table '{}' created.", store.table_name()),
        TableCreation::AlreadyExists => {
            println!("Table '{}' already exists.", store.table_name())
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(conn: &str) -> StoreSettings {
        StoreSettings {
            connection_string: conn.to_string(),
            table_name: "TextAnalysisResults".to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_memory_table() {
        let store = open_table(&settings("memory:")).await.unwrap();
        assert_eq!(store.table_name(), "TextAnalysisResults");
        assert_eq!(
            store.create_table_if_absent().await.unwrap(),
            TableCreation::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_open_sqlite_table() {
        let tmp = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite:{}", tmp.path().join("nested/results.sqlite").display());
        let store = open_table(&settings(&url)).await.unwrap();
        assert_eq!(
            store.create_table_if_absent().await.unwrap(),
            TableCreation::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_connect_does_not_create() {
        let store = connect_table(&settings("memory:")).await.unwrap();
        assert_eq!(
            store.create_table_if_absent().await.unwrap(),
            TableCreation::Created
        );
    }

    #[tokio::test]
    async fn test_open_unknown_scheme() {
        let err = open_table(&settings("DefaultEndpointsProtocol=https;AccountName=x"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::UnsupportedConnectionString(_)));
    }
}
