//! JSON HTTP API server.
//!
//! Exposes the resolution pipeline and the inventory store to the web
//! client over a small JSON API.
//!
//! # Endpoints
//!
//! | Method   | Path | Description |
//! |----------|------|-------------|
//! | `GET`    | `/api/search` | Catalog search (`q`, optional weight/volume filters) |
//! | `POST`   | `/api/resolve` | Resolve free text into an item record |
//! | `GET`    | `/api/inventory` | List inventory records |
//! | `POST`   | `/api/inventory` | Resolve text and add it to the inventory |
//! | `DELETE` | `/api/inventory/{id}` | Remove one record |
//! | `GET`    | `/api/stats` | Inventory totals and per-category breakdown |
//! | `GET`    | `/api/cache` | Lookup cache occupancy |
//! | `POST`   | `/api/cache/clear` | Reset the lookup cache |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "item text must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//! A duplicate in-flight resolution is not an error: it returns `202` with
//! `{ "status": "pending" }` and the client retries.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted — the web client is
//! served from a different origin during development.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::matcher::{search_catalog, SearchFilters};
use crate::resolver::Resolver;
use crate::store;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    resolver: Arc<Resolver>,
}

/// Start the API server. Binds to `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let config = Arc::new(config.clone());
    let resolver = Arc::new(Resolver::new(&config));

    let state = AppState { config, resolver };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/search", get(handle_search))
        .route("/api/resolve", post(handle_resolve))
        .route("/api/inventory", get(handle_list).post(handle_add))
        .route("/api/inventory/{id}", delete(handle_remove))
        .route("/api/stats", get(handle_stats))
        .route("/api/cache", get(handle_cache_stats))
        .route("/api/cache/clear", post(handle_cache_clear))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("Haulkit API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Map pipeline/store errors to the most appropriate HTTP status.
/// Validation wording → 400; everything else is a server fault.
fn classify_error(err: anyhow::Error) -> AppError {
    let msg = err.to_string();

    if msg.contains("must not be empty")
        || msg.contains("too long")
        || msg.contains("must be >=")
        || msg.contains("already in the inventory")
        || msg.contains("nothing to update")
    {
        bad_request(msg)
    } else {
        internal(msg)
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

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    min_weight: Option<f64>,
    max_weight: Option<f64>,
    min_volume: Option<f64>,
    max_volume: Option<f64>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<serde_json::Value> {
    let filters = SearchFilters {
        min_weight: params.min_weight,
        max_weight: params.max_weight,
        min_volume: params.min_volume,
        max_volume: params.max_volume,
    };

    let outcome = search_catalog(
        Catalog::builtin(),
        &params.q,
        &filters,
        &state.config.matcher,
    );

    Json(serde_json::json!({
        "matches": outcome.matches,
        "suggestions": outcome.suggestions,
    }))
}

// ============ POST /api/resolve ============

#[derive(Deserialize)]
struct ResolveRequest {
    #[serde(rename = "itemText")]
    item_text: String,
}

async fn handle_resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Response, AppError> {
    let resolved = state
        .resolver
        .resolve_with_catalog(&req.item_text)
        .await
        .map_err(classify_error)?;

    match resolved {
        Some(item) => Ok(Json(serde_json::json!({ "item": item })).into_response()),
        None => Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "status": "pending",
                "itemText": req.item_text,
            })),
        )
            .into_response()),
    }
}

// ============ Inventory endpoints ============

async fn handle_list(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let records = store::list_records(&state.config)
        .await
        .map_err(classify_error)?;

    Ok(Json(serde_json::json!({ "records": records })))
}

#[derive(Deserialize)]
struct AddRequest {
    #[serde(rename = "itemText")]
    item_text: String,
    #[serde(default = "default_quantity")]
    quantity: i64,
    #[serde(default = "default_location")]
    location: String,
    notes: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

fn default_location() -> String {
    "unassigned".to_string()
}

async fn handle_add(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Response, AppError> {
    let resolved = state
        .resolver
        .resolve_with_catalog(&req.item_text)
        .await
        .map_err(classify_error)?;

    let item = match resolved {
        Some(item) => item,
        None => {
            return Ok((
                StatusCode::ACCEPTED,
                Json(serde_json::json!({
                    "status": "pending",
                    "itemText": req.item_text,
                })),
            )
                .into_response())
        }
    };

    let record = store::add_record(
        &state.config,
        &item,
        req.quantity,
        &req.location,
        req.notes.as_deref(),
    )
    .await
    .map_err(classify_error)?;

    Ok(Json(serde_json::json!({ "record": record })).into_response())
}

async fn handle_remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = store::remove_record(&state.config, &id)
        .await
        .map_err(classify_error)?;

    if !removed {
        return Err(not_found(format!("no inventory record with id {}", id)));
    }

    Ok(Json(serde_json::json!({ "removed": true, "id": id })))
}

// ============ GET /api/stats ============

async fn handle_stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let totals = store::totals(&state.config).await.map_err(classify_error)?;
    let categories = store::category_totals(&state.config)
        .await
        .map_err(classify_error)?;

    Ok(Json(serde_json::json!({
        "totals": totals,
        "categories": categories,
    })))
}

// ============ Cache endpoints ============

async fn handle_cache_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "cache": state.resolver.cache().stats() }))
}

async fn handle_cache_clear(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.resolver.cache().clear();
    Json(serde_json::json!({ "cleared": true }))
}
