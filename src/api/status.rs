use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use crate::{
    api::response::{ProcessInfo, ResetResponse, StatusResponse},
    slot::AppState,
};

/// GET /status - Counters and uptime of this slot
///
/// The request being answered is already included in `totalRequests`.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.slot.snapshot();
    let now = Utc::now();

    Json(StatusResponse {
        status: "OK".to_string(),
        identity: state.identity().to_string(),
        timestamp: now,
        uptime_seconds: snapshot.uptime_seconds(now),
        total_requests: snapshot.total_requests,
        load_requests: snapshot.load_requests,
        process_info: process_info(&state),
    })
}

/// POST /reset - Restart the statistics window
pub async fn reset_statistics(State(state): State<AppState>) -> Json<ResetResponse> {
    let restarted_at = state.slot.reset();
    info!(identity = state.identity(), %restarted_at, "statistics reset");

    Json(ResetResponse {
        message: "Statistics reset".to_string(),
        identity: state.identity().to_string(),
        timestamp: restarted_at,
    })
}

fn process_info(state: &AppState) -> ProcessInfo {
    ProcessInfo {
        port: state.port,
        version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
        pid: std::process::id(),
        instance_id: state.instance_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> AppState {
        let mut cfg = Config::default();
        cfg.server.port = 3002;
        AppState::new(&cfg)
    }

    #[tokio::test]
    async fn test_status_reflects_counters() {
        let st = state();
        st.slot.record_request();
        st.slot.record_request();
        st.slot.record_load_request();

        let Json(status) = get_status(State(st.clone())).await;
        assert_eq!(status.status, "OK");
        assert_eq!(status.identity, "BLUE");
        assert_eq!(status.total_requests, 2);
        assert_eq!(status.load_requests, 1);
        assert_eq!(status.process_info.port, 3002);
        assert_eq!(status.process_info.instance_id, st.instance_id);
    }

    #[tokio::test]
    async fn test_reset_zeroes_counters() {
        let st = state();
        st.slot.record_request();
        st.slot.record_load_request();

        let Json(reset) = reset_statistics(State(st.clone())).await;
        assert_eq!(reset.message, "Statistics reset");

        let snap = st.slot.snapshot();
        assert_eq!(snap.total_requests, 0);
        assert_eq!(snap.load_requests, 0);
        assert_eq!(snap.started_at, reset.timestamp);
    }
}
