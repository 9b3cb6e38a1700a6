pub mod latency;
pub mod state;

use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;

pub use latency::LatencySimulator;
pub use state::{SlotSnapshot, SlotState};

/// Shared handler state. Cloned per request; the slot itself is shared.
#[derive(Clone)]
pub struct AppState {
    pub slot: Arc<SlotState>,
    pub latency: LatencySimulator,
    pub port: u16,
    pub instance_id: Uuid,
}

impl AppState {
    pub fn new(cfg: &Config) -> Self {
        Self {
            slot: Arc::new(SlotState::new(cfg.server.identity.clone())),
            latency: LatencySimulator::new(cfg.stress.max_delay_ms),
            port: cfg.server.port,
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn identity(&self) -> &str {
        self.slot.identity()
    }
}
