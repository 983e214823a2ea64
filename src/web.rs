//! HTTP surface for the inventory view.
//!
//! Exposes the synchronizer's entry points to a presentation layer: read
//! the current view, refresh it from the store, add or remove one unit of
//! an item, and change the search term.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::InventoryError;
use crate::sync::{Synchronizer, ViewSnapshot};

/// Shared application state (the synchronizer behind every endpoint)
#[derive(Clone)]
struct AppState {
    sync: Arc<Synchronizer>,
}

/// Search request body
#[derive(Deserialize)]
struct SearchBody {
    term: String,
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

type SnapshotResponse = (StatusCode, Json<ApiResponse<ViewSnapshot>>);

/// Maps an operation failure to the status the presentation layer sees:
/// bad input is the caller's fault, conflicts are retryable, everything
/// else means the store behind us is unhealthy.
fn error_status(error: &InventoryError) -> StatusCode {
    match error {
        InventoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        InventoryError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn snapshot_ok(snapshot: ViewSnapshot) -> SnapshotResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(snapshot),
            error: None,
        }),
    )
}

fn snapshot_err(error: InventoryError) -> SnapshotResponse {
    (
        error_status(&error),
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }),
    )
}

/// GET /api/inventory - current view, no store round-trip
async fn inventory_handler(State(state): State<AppState>) -> Json<ApiResponse<ViewSnapshot>> {
    Json(ApiResponse {
        success: true,
        data: Some(state.sync.snapshot().await),
        error: None,
    })
}

/// POST /api/refresh - re-read the whole inventory from the store
async fn refresh_handler(State(state): State<AppState>) -> SnapshotResponse {
    match state.sync.refresh().await {
        Ok(()) => snapshot_ok(state.sync.snapshot().await),
        Err(e) => {
            log::error!("Refresh failed: {}", e);
            snapshot_err(e)
        }
    }
}

/// POST /api/items/{name}/add - one more unit of `name`
async fn add_handler(State(state): State<AppState>, Path(name): Path<String>) -> SnapshotResponse {
    match state.sync.add(&name).await {
        Ok(()) => snapshot_ok(state.sync.snapshot().await),
        Err(e) => {
            log::error!("Failed to add '{}': {}", name, e);
            snapshot_err(e)
        }
    }
}

/// POST /api/items/{name}/remove - one unit less of `name`
async fn remove_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> SnapshotResponse {
    match state.sync.remove(&name).await {
        Ok(()) => snapshot_ok(state.sync.snapshot().await),
        Err(e) => {
            log::error!("Failed to remove '{}': {}", name, e);
            snapshot_err(e)
        }
    }
}

/// POST /api/search - replace the search term and return the narrowed view
async fn search_handler(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Json<ApiResponse<ViewSnapshot>> {
    state.sync.set_search_term(&body.term).await;
    Json(ApiResponse {
        success: true,
        data: Some(state.sync.snapshot().await),
        error: None,
    })
}

/// Build the API router
pub fn create_router(sync: Arc<Synchronizer>) -> Router {
    let state = AppState { sync };

    Router::new()
        .route("/api/inventory", get(inventory_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/items/{name}/add", post(add_handler))
        .route("/api/items/{name}/remove", post(remove_handler))
        .route("/api/search", post(search_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
/// When running locally, use firewall rules to restrict access.
pub async fn serve(
    sync: Arc<Synchronizer>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(sync);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Inventory API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("Received Ctrl+C, shutting down");
        })
        .await?;

    Ok(())
}
