use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use common::storage::indexes::vector_index_dimension;

use crate::api_state::ApiState;

/// Readiness probe: 200 only when the store answers and the vector index is
/// defined; 503 otherwise, with the failing check named.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    if let Err(e) = state.db.client.query("RETURN true").await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "db": "fail" },
                "reason": e.to_string()
            })),
        );
    }

    match vector_index_dimension(&state.db).await {
        Ok(Some(dimension)) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "db": "ok", "index": "ok" },
                "index_dimension": dimension
            })),
        ),
        Ok(None) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "db": "ok", "index": "missing" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "db": "ok", "index": "fail" },
                "reason": e.to_string()
            })),
        ),
    }
}
