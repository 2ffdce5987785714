//! SQLite-backed [`TableStore`].
//!
//! Each store table maps to one SQLite table with the flat entity columns
//! and a composite primary key on `(PartitionKey, RowKey)`. Native query
//! order is `rowid`, i.e. insertion order.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::config::validate_table_name;
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::models::TableEntity;

use super::{TableCreation, TableStore};

/// SQLite implementation of the [`TableStore`] trait.
pub struct SqliteTableStore {
    pool: SqlitePool,
    table_name: String,
}

impl SqliteTableStore {
    /// Wrap an existing pool. The table name is interpolated into SQL, so it
    /// must pass [`validate_table_name`].
    pub fn new(pool: SqlitePool, table_name: &str) -> StoreResult<Self> {
        validate_table_name(table_name).map_err(|e| StoreError::CreateTable {
            table: table_name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pool,
            table_name: table_name.to_string(),
        })
    }

    pub async fn connect(connection_string: &str, table_name: &str) -> StoreResult<Self> {
        let pool = db::connect(connection_string).await?;
        Self::new(pool, table_name)
    }

    async fn table_exists(&self) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name = ? COLLATE NOCASE",
        )
        .bind(&self.table_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TableStore for SqliteTableStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn create_table_if_absent(&self) -> StoreResult<TableCreation> {
        if self.table_exists().await? {
            return Ok(TableCreation::AlreadyExists);
        }

        let ddl = format!(
            r#"
            CREATE TABLE "{}" (
                PartitionKey TEXT NOT NULL,
                RowKey TEXT NOT NULL,
                analysisJson TEXT,
                metadataJson TEXT,
                originalText TEXT,
                createdAt TEXT,
                PRIMARY KEY (PartitionKey, RowKey)
            )
            "#,
            self.table_name
        );

        match sqlx::query(&ddl).execute(&self.pool).await {
            Ok(_) => Ok(TableCreation::Created),
            Err(e) => {
                // Another process may have created it between the check and the DDL
                if self.table_exists().await? {
                    return Ok(TableCreation::AlreadyExists);
                }
                Err(StoreError::CreateTable {
                    table: self.table_name.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn insert_entity(&self, entity: &TableEntity) -> StoreResult<()> {
        let sql = format!(
            r#"
            INSERT INTO "{}" (PartitionKey, RowKey, analysisJson, metadataJson,
                              originalText, createdAt)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            self.table_name
        );

        let result = sqlx::query(&sql)
            .bind(&entity.partition_key)
            .bind(&entity.row_key)
            .bind(&entity.analysis_json)
            .bind(&entity.metadata_json)
            .bind(&entity.original_text)
            .bind(&entity.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::EntityAlreadyExists {
                    partition_key: entity.partition_key.clone(),
                    row_key: entity.row_key.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn query_partition(
        &self,
        partition_key: &str,
        results_per_page: usize,
    ) -> StoreResult<Vec<TableEntity>> {
        let sql = format!(
            r#"
            SELECT PartitionKey, RowKey, analysisJson, metadataJson, originalText, createdAt
            FROM "{}"
            WHERE PartitionKey = ?
            ORDER BY rowid
            LIMIT ?
            "#,
            self.table_name
        );

        let rows = sqlx::query(&sql)
            .bind(partition_key)
            .bind(i64::try_from(results_per_page).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| TableEntity {
                partition_key: row.get("PartitionKey"),
                row_key: row.get("RowKey"),
                analysis_json: row.get("analysisJson"),
                metadata_json: row.get("metadataJson"),
                original_text: row.get("originalText"),
                created_at: row.get("createdAt"),
            })
            .collect())
    }
}
