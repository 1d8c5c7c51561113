use axum::{extract::State, http::StatusCode, Json};
use common::types::Health;

use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "ops",
    responses((status = 200, description = "Service and storage backend", body = crate::openapi::HealthDoc)))]
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health { status: "ok", storage: state.store.backend().to_string() })
}

pub async fn metrics() -> (StatusCode, String) {
    service::metrics::encode_metrics()
}
