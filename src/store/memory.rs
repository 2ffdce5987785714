//! In-memory [`TableStore`] for tests and throwaway servers.
//!
//! Tables live in a `HashMap` behind `std::sync::RwLock`. Rows keep
//! insertion order, which doubles as the native query order.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::models::TableEntity;

use super::{TableCreation, TableStore};

/// Process-local table store. Tables are created lazily through
/// [`TableStore::create_table_if_absent`].
pub struct InMemoryTableStore {
    table_name: String,
    tables: RwLock<HashMap<String, Vec<TableEntity>>>,
}

impl InMemoryTableStore {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entities, or `None` when the table was never created.
    pub fn row_count(&self) -> Option<usize> {
        let tables = self.tables.read().unwrap();
        tables.get(&self.table_name).map(Vec::len)
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn create_table_if_absent(&self) -> StoreResult<TableCreation> {
        let mut tables = self.tables.write().unwrap();
        if tables.contains_key(&self.table_name) {
            return Ok(TableCreation::AlreadyExists);
        }
        tables.insert(self.table_name.clone(), Vec::new());
        Ok(TableCreation::Created)
    }

    async fn insert_entity(&self, entity: &TableEntity) -> StoreResult<()> {
        let mut tables = self.tables.write().unwrap();
        let rows = tables
            .get_mut(&self.table_name)
            .ok_or_else(|| StoreError::TableNotFound(self.table_name.clone()))?;

        if rows
            .iter()
            .any(|r| r.partition_key == entity.partition_key && r.row_key == entity.row_key)
        {
            return Err(StoreError::EntityAlreadyExists {
                partition_key: entity.partition_key.clone(),
                row_key: entity.row_key.clone(),
            });
        }

        rows.push(entity.clone());
        Ok(())
    }

    async fn query_partition(
        &self,
        partition_key: &str,
        results_per_page: usize,
    ) -> StoreResult<Vec<TableEntity>> {
        let tables = self.tables.read().unwrap();
        let rows = tables
            .get(&self.table_name)
            .ok_or_else(|| StoreError::TableNotFound(self.table_name.clone()))?;

        Ok(rows
            .iter()
            .filter(|r| r.partition_key == partition_key)
            .take(results_per_page)
            .cloned()
            .collect())
    }
}
