use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use text_analyzer::error::{StoreError, StoreResult};
use text_analyzer::models::TableEntity;
use text_analyzer::server::{router, AppState};
use text_analyzer::store::{InMemoryTableStore, TableCreation, TableStore};

/// A store whose every operation fails, for the degraded paths.
struct BrokenStore;

#[async_trait]
impl TableStore for BrokenStore {
    fn table_name(&self) -> &str {
        "Broken"
    }

    async fn create_table_if_absent(&self) -> StoreResult<TableCreation> {
        Err(StoreError::CreateTable {
            table: "Broken".to_string(),
            reason: "service unavailable".to_string(),
        })
    }

    async fn insert_entity(&self, _entity: &TableEntity) -> StoreResult<()> {
        Err(StoreError::TableNotFound("Broken".to_string()))
    }

    async fn query_partition(
        &self,
        _partition_key: &str,
        _results_per_page: usize,
    ) -> StoreResult<Vec<TableEntity>> {
        Err(StoreError::TableNotFound("Broken".to_string()))
    }
}

async fn memory_state() -> (AppState, Arc<InMemoryTableStore>) {
    let store = Arc::new(InMemoryTableStore::new("TextAnalysisResults"));
    store.create_table_if_absent().await.unwrap();
    (AppState::new(store.clone()), store)
}

async fn send(state: AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_post_analyzes_and_stores() {
    let (state, store) = memory_state().await;

    let (status, body) = send(
        state,
        post_json("/TextAnalyzer", r#"{"text": "Hello world. How are you?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["wordCount"], 5);
    assert_eq!(body["analysis"]["sentenceCount"], 2);
    assert_eq!(body["analysis"]["longestWord"], "Hello");
    assert_eq!(body["analysis"]["averageWordLength"], 4.2);
    assert_eq!(body["metadata"]["textPreview"], "Hello world. How are you?");
    assert!(body["id"].as_str().is_some());
    assert!(body.get("storageWarning").is_none());
    assert_eq!(store.row_count(), Some(1));
}

#[tokio::test]
async fn test_get_with_query_text() {
    let (state, _store) = memory_state().await;

    let (status, body) = send(state, get("/TextAnalyzer?text=one%20two%20three")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["wordCount"], 3);
    assert_eq!(body["analysis"]["characterCount"], 13);
}

#[tokio::test]
async fn test_query_takes_precedence_over_body() {
    let (state, _store) = memory_state().await;

    let (status, body) = send(
        state,
        post_json("/TextAnalyzer?text=query", r#"{"text": "body text here"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["wordCount"], 1);
    assert_eq!(body["metadata"]["textPreview"], "query");
}

#[tokio::test]
async fn test_missing_text_is_bad_request() {
    let (state, store) = memory_state().await;

    let (status, body) = send(state, get("/TextAnalyzer")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");
    assert!(body["howToUse"]["option1"]
        .as_str()
        .unwrap()
        .contains("?text="));
    assert!(body["howToUse"]["option2"]
        .as_str()
        .unwrap()
        .contains("POST"));
    assert_eq!(store.row_count(), Some(0));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (state, _store) = memory_state().await;

    let (status, body) = send(state, post_json("/TextAnalyzer", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");
}

#[tokio::test]
async fn test_failed_write_still_returns_ok_with_warning() {
    let state = AppState::new(Arc::new(BrokenStore));

    let (status, body) = send(state, post_json("/TextAnalyzer", r#"{"text": "Keep going."}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["wordCount"], 2);
    assert_eq!(body["storageWarning"], "Table 'Broken' does not exist");
}

#[tokio::test]
async fn test_history_round_trip() {
    let (state, _store) = memory_state().await;

    let (_, first) = send(
        state.clone(),
        post_json("/TextAnalyzer", r#"{"text": "First entry.\n\nSecond paragraph!"}"#),
    )
    .await;
    let (_, second) = send(state.clone(), get("/TextAnalyzer?text=second")).await;

    let (status, body) = send(state, get("/GetAnalysisHistory")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    let stored_first = results.iter().find(|r| r["id"] == first["id"]).unwrap();
    assert_eq!(stored_first["analysis"], first["analysis"]);
    assert_eq!(stored_first["metadata"], first["metadata"]);
    assert_eq!(stored_first["analysis"]["paragraphCount"], 2);

    let stored_second = results.iter().find(|r| r["id"] == second["id"]).unwrap();
    assert_eq!(stored_second["analysis"], second["analysis"]);
}

#[tokio::test]
async fn test_history_limit_is_clamped() {
    let (state, _store) = memory_state().await;
    for i in 0..3 {
        let (status, _) = send(state.clone(), get(&format!("/TextAnalyzer?text=entry{}", i))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(state.clone(), get("/GetAnalysisHistory?limit=0")).await;
    assert_eq!(body["count"], 1);

    let (_, body) = send(state.clone(), get("/GetAnalysisHistory?limit=2")).await;
    assert_eq!(body["count"], 2);

    let (_, body) = send(state.clone(), get("/GetAnalysisHistory?limit=999")).await;
    assert_eq!(body["count"], 3);

    let (status, body) = send(state, get("/GetAnalysisHistory?limit=abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_repeated_query_params_use_first_value() {
    let (state, _store) = memory_state().await;

    let (status, body) = send(state.clone(), get("/TextAnalyzer?text=a&text=b%20c")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["textPreview"], "a");
    assert_eq!(body["analysis"]["wordCount"], 1);

    for i in 0..7 {
        let (status, _) = send(state.clone(), get(&format!("/TextAnalyzer?text=entry{}", i))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(state, get("/GetAnalysisHistory?limit=5&limit=6")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
}

#[tokio::test]
async fn test_history_store_failure_is_server_error() {
    let state = AppState::new(Arc::new(BrokenStore));

    let (status, body) = send(state, get("/GetAnalysisHistory")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "error": "Failed to fetch history",
            "details": "Table 'Broken' does not exist"
        })
    );
}

#[tokio::test]
async fn test_health() {
    let (state, _store) = memory_state().await;

    let (status, body) = send(state, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
