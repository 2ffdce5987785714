//! HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`, `POST` | `/TextAnalyzer` | Analyze `?text=` or a `{"text": ...}` body |
//! | `GET` | `/GetAnalysisHistory` | List stored analyses (`?limit=`, 1-50, default 10) |
//! | `GET` | `/health` | Health check (returns version) |
//!
//! None of the endpoints require authentication.
//!
//! # Error Contract
//!
//! Missing text is a 400 that explains both input methods:
//!
//! ```json
//! { "error": "No text provided", "howToUse": { "option1": "...", "option2": "..." } }
//! ```
//!
//! A failed history read is a 500 with `{ "error", "details" }`. A failed
//! write on the analyze path is *not* an error: the response stays 200 and
//! carries a `storageWarning` field.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::analyze::{analyze_and_store, AnalyzeResponse};
use crate::config::Config;
use crate::error::StoreError;
use crate::history::{clamp_limit, fetch_history, HistoryResponse};
use crate::store::{open_table, TableStore};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Table handle, opened once per process.
    pub store: Arc<dyn TableStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }
}

/// Build the router with all endpoints and the CORS layer.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/TextAnalyzer",
            get(handle_analyze).post(handle_analyze),
        )
        .route("/GetAnalysisHistory", get(handle_history))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Opens the configured table (creating it if needed), then serves on
/// `[server].bind` until the process is terminated. A missing connection
/// string fails here, before any request is accepted.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let settings = config.store.resolve()?;
    let store = open_table(&settings).await?;

    let app = router(AppState::new(store));

    tracing::info!(bind = %config.server.bind, table = %settings.table_name, "Text analyzer listening");

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MissingTextBody {
    error: &'static str,
    how_to_use: HowToUse,
}

#[derive(Serialize)]
struct HowToUse {
    option1: &'static str,
    option2: &'static str,
}

#[derive(Serialize)]
struct FailureBody {
    error: &'static str,
    details: String,
}

/// Errors the handlers surface to callers.
#[derive(Debug)]
pub enum ApiError {
    /// Neither the query string nor the body carried any text.
    NoText,
    /// The store could not be read for history.
    HistoryUnavailable(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NoText => {
                let body = MissingTextBody {
                    error: "No text provided",
                    how_to_use: HowToUse {
                        option1: "Add ?text=YourText to the URL",
                        option2: r#"Send a POST request with JSON body: {"text": "Your text here"}"#,
                    },
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::HistoryUnavailable(e) => {
                let body = FailureBody {
                    error: "Failed to fetch history",
                    details: e.to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET|POST /TextAnalyzer ============

/// First value of `key` in the query string. Repeated keys are allowed,
/// later occurrences are ignored.
fn first_param(params: &[(String, String)], key: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Handler for `GET|POST /TextAnalyzer`.
///
/// Returns 200 with the analysis whether or not it could be stored, and
/// 400 when no text was supplied.
async fn handle_analyze(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    tracing::info!("Text Analyzer API was called");

    let text = resolve_text(first_param(&params, "text"), &body).ok_or(ApiError::NoText)?;
    let response = analyze_and_store(state.store.as_ref(), &text).await;

    Ok(Json(response))
}

/// Pick the input text: a non-empty `text` query parameter wins, otherwise
/// the `text` string of a JSON object body. Bodies that are not JSON, not
/// objects, or whose `text` is not a string count as having no text.
pub fn resolve_text(query_text: Option<String>, body: &[u8]) -> Option<String> {
    query_text
        .filter(|t| !t.is_empty())
        .or_else(|| text_from_body(body))
        .filter(|t| !t.is_empty())
}

fn text_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("text")?.as_str().map(str::to_string)
}

// ============ GET /GetAnalysisHistory ============

/// Handler for `GET /GetAnalysisHistory`.
async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<HistoryResponse>, ApiError> {
    tracing::info!("GetAnalysisHistory API was called");

    let limit = clamp_limit(first_param(&params, "limit").as_deref());
    let history = fetch_history(state.store.as_ref(), limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to read from table storage");
            ApiError::HistoryUnavailable(e)
        })?;

    Ok(Json(history))
}
