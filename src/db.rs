use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};

/// Open a pool for a `sqlite:` connection string, creating the database
/// file (and its parent directory) when missing.
pub async fn connect(connection_string: &str) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(connection_string)
        .map_err(StoreError::Connect)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    // Ensure parent directory exists
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(StoreError::Connect)?;

    Ok(pool)
}
