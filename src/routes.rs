//! Router assembly: health endpoints plus the parameterized entity routes.
//! Handlers resolve the concrete entity from the path segment.

use crate::handlers::entity::{create, delete, list, method_not_allowed, read, update};
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Entity CRUD routes, mounted under `/api` by the server. Unmapped verbs on
/// these routes answer 405 through the method-router fallback.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/:segment",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/:segment/:id",
            get(read)
                .put(update)
                .delete(delete)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Unauthenticated operational routes: GET /health, GET /version.
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}
