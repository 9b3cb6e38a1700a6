use axum::{extract::State, Json};
use chrono::Utc;

use crate::{api::response::HealthResponse, slot::AppState};

/// GET /health - Liveness check
///
/// Has no failure path: a process able to answer is healthy.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        identity: state.identity().to_string(),
        timestamp: Utc::now(),
    })
}
