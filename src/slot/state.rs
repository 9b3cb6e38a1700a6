use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Request accounting for one slot instance.
///
/// The identity is fixed for the lifetime of the process. Counters and the
/// start time sit behind one lock so snapshots are never torn and a reset
/// clears all three together.
#[derive(Debug)]
pub struct SlotState {
    identity: String,
    counters: Mutex<Counters>,
}

#[derive(Debug)]
struct Counters {
    started_at: DateTime<Utc>,
    total_requests: u64,
    load_requests: u64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub started_at: DateTime<Utc>,
    pub total_requests: u64,
    pub load_requests: u64,
}

impl SlotSnapshot {
    /// Whole seconds since start (or the last reset), truncated.
    pub fn uptime_seconds(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }
}

impl SlotState {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            counters: Mutex::new(Counters {
                started_at: Utc::now(),
                total_requests: 0,
                load_requests: 0,
            }),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Counts one inbound request and returns its sequence number.
    pub fn record_request(&self) -> u64 {
        let mut c = self.counters.lock();
        c.total_requests += 1;
        c.total_requests
    }

    /// Counts one synthetic load request and returns its sequence number.
    pub fn record_load_request(&self) -> u64 {
        let mut c = self.counters.lock();
        c.load_requests += 1;
        // a load request counted before a reset is re-counted in the new window
        if c.total_requests < c.load_requests {
            c.total_requests = c.load_requests;
        }
        c.load_requests
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let c = self.counters.lock();
        SlotSnapshot {
            started_at: c.started_at,
            total_requests: c.total_requests,
            load_requests: c.load_requests,
        }
    }

    /// Restarts the statistics window and returns the new start time.
    pub fn reset(&self) -> DateTime<Utc> {
        let mut c = self.counters.lock();
        c.started_at = Utc::now();
        c.total_requests = 0;
        c.load_requests = 0;
        c.started_at
    }
}
