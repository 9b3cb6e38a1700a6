use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    api::response::{Endpoints, IndexResponse},
    slot::AppState,
};

/// GET / - Banner naming the slot and the available endpoints
pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        message: format!("Blue Green Deployment Test Server - {}", state.identity()),
        identity: state.identity().to_string(),
        timestamp: Utc::now(),
        endpoints: Endpoints::default(),
    })
}
