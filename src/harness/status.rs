use std::fmt;
use tracing::{info, warn};

use crate::api::response::StatusResponse;

/// Outcome of one status poll, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusView {
    Online(StatusResponse),
    Unreachable { reason: String },
}

impl StatusView {
    pub fn identity(&self) -> Option<&str> {
        match self {
            StatusView::Online(status) => Some(&status.identity),
            StatusView::Unreachable { .. } => None,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, StatusView::Online(_))
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusView::Online(s) => {
                writeln!(f, "Status: {}", s.status)?;
                writeln!(f, "Slot: {}", s.identity)?;
                writeln!(f, "Timestamp: {}", s.timestamp.to_rfc3339())?;
                writeln!(f, "Uptime: {}s", s.uptime_seconds)?;
                write!(
                    f,
                    "Requests: {} total, {} load",
                    s.total_requests, s.load_requests
                )
            }
            StatusView::Unreachable { reason } => {
                write!(f, "Error: could not reach server ({reason})")
            }
        }
    }
}

/// Where status polls are rendered.
pub trait StatusSink: Send + Sync {
    fn render(&self, view: &StatusView);
}

/// Renders status polls as log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn render(&self, view: &StatusView) {
        match view {
            StatusView::Online(s) => info!(
                identity = %s.identity,
                uptime_seconds = s.uptime_seconds,
                total_requests = s.total_requests,
                load_requests = s.load_requests,
                "slot responding"
            ),
            StatusView::Unreachable { reason } => warn!(%reason, "status check failed"),
        }
    }
}
