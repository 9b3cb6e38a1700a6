use axum::{extract::State, Json};
use chrono::Utc;
use tracing::debug;

use crate::{api::response::StressResponse, slot::AppState};

/// GET /stress - Synthetic work with a random delay
///
/// The load counter is bumped before the delay so `requestNumber` is the
/// arrival order, not the completion order.
pub async fn simulate_load(State(state): State<AppState>) -> Json<StressResponse> {
    let request_number = state.slot.record_load_request();
    let delay = state.latency.simulate().await;
    let processing_time_ms = delay.as_millis() as u64;
    debug!(request_number, processing_time_ms, "stress request served");

    Json(StressResponse {
        message: "Stress test response".to_string(),
        identity: state.identity().to_string(),
        request_number,
        processing_time_ms,
        timestamp: Utc::now(),
    })
}
