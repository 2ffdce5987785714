//! Reading stored analyses back.
//!
//! Used by both the `history` CLI command and `GET /GetAnalysisHistory`.

use serde::Serialize;
use serde_json::Value;
use std::num::IntErrorKind;

use crate::config::Config;
use crate::error::StoreResult;
use crate::models::{TableEntity, PARTITION_KEY};
use crate::store::{open_table, TableStore};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 50;

/// One stored analysis as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub id: String,
    pub analysis: Value,
    pub metadata: Value,
}

/// `{ count, results }` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub results: Vec<HistoryItem>,
}

/// Turn a raw `limit` parameter into the effective limit.
///
/// Anything that does not parse as an integer means [`DEFAULT_LIMIT`];
/// the result is clamped to `1..=MAX_LIMIT`.
pub fn clamp_limit(raw: Option<&str>) -> usize {
    let requested = match raw.map(|s| s.trim().parse::<i64>()) {
        Some(Ok(n)) => n,
        // Out-of-range integers still clamp to the nearest bound
        Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
        Some(Err(e)) if *e.kind() == IntErrorKind::NegOverflow => i64::MIN,
        _ => DEFAULT_LIMIT as i64,
    };
    requested.clamp(1, MAX_LIMIT as i64) as usize
}

/// Fetch at most `limit` stored analyses.
///
/// `limit` is passed to the store as a page size and enforced again here,
/// since backends treat the page size as a hint.
pub async fn fetch_history(store: &dyn TableStore, limit: usize) -> StoreResult<HistoryResponse> {
    let entities = store.query_partition(PARTITION_KEY, limit).await?;

    let results: Vec<HistoryItem> = entities.iter().take(limit).map(decode_entity).collect();

    Ok(HistoryResponse {
        count: results.len(),
        results,
    })
}

/// `history` command: print stored analyses as JSON.
pub async fn run_history(config: &Config, limit: Option<&str>) -> anyhow::Result<()> {
    let settings = config.store.resolve()?;
    let store = open_table(&settings).await?;

    let history = fetch_history(store.as_ref(), clamp_limit(limit)).await?;
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

/// Rebuild the structured view of a stored entity.
pub fn decode_entity(entity: &TableEntity) -> HistoryItem {
    HistoryItem {
        id: entity.row_key.clone(),
        analysis: decode_json_field(
            &entity.row_key,
            "analysisJson",
            entity.analysis_json.as_deref(),
        ),
        metadata: decode_json_field(
            &entity.row_key,
            "metadataJson",
            entity.metadata_json.as_deref(),
        ),
    }
}

/// Missing fields read as `{}`; so do corrupt ones, with a warning.
fn decode_json_field(row_key: &str, field: &str, raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Object(Default::default());
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(row_key, field, error = %e, "Stored field is not valid JSON");
            Value::Object(Default::default())
        }
    }
}
