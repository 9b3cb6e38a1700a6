//! JSON bodies served by the slot API. The harness decodes the same types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `GET /` descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub message: String,
    pub identity: String,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    pub status: String,
    pub stress: String,
    pub health: String,
    pub reset: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            status: "/status".to_string(),
            stress: "/stress".to_string(),
            health: "/health".to_string(),
            reset: "/reset (POST)".to_string(),
        }
    }
}

/// `GET /status` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub identity: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub load_requests: u64,
    pub process_info: ProcessInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub port: u16,
    pub version: String,
    pub platform: String,
    pub pid: u32,
    pub instance_id: Uuid,
}

/// `GET /health` liveness descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub identity: String,
    pub timestamp: DateTime<Utc>,
}

/// `GET /stress` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressResponse {
    pub message: String,
    pub identity: String,
    pub request_number: u64,
    pub processing_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// `POST /reset` confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    pub identity: String,
    pub timestamp: DateTime<Utc>,
}
