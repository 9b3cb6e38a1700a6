use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Result of one synthetic load call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StressOutcome {
    pub succeeded: bool,
    /// Round trip as seen by the harness.
    pub latency_ms: f64,
    /// Delay the server reports it simulated. Absent on failure.
    pub server_processing_ms: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StressOutcome {
    pub fn success(
        started_at: DateTime<Utc>,
        latency: Duration,
        server_processing_ms: u64,
    ) -> Self {
        Self {
            succeeded: true,
            latency_ms: as_millis_f64(latency),
            server_processing_ms: Some(server_processing_ms),
            started_at,
            finished_at: Utc::now(),
            error: None,
        }
    }

    pub fn failure(started_at: DateTime<Utc>, latency: Duration, error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            latency_ms: as_millis_f64(latency),
            server_processing_ms: None,
            started_at,
            finished_at: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// Summary over one batch of concurrent calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub requested: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// Wall clock from the first call issued to the last outcome settled.
    pub total_duration_ms: f64,
    /// `total_duration_ms / requested`.
    pub mean_latency_ms: f64,
    pub throughput_per_sec: f64,
    pub min_call_latency_ms: Option<f64>,
    pub max_call_latency_ms: Option<f64>,
    pub mean_call_latency_ms: Option<f64>,
    pub mean_server_processing_ms: Option<f64>,
}

impl AggregateReport {
    pub fn from_outcomes(requested: u32, outcomes: &[StressOutcome], total: Duration) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count() as u32;
        let failed = requested.saturating_sub(succeeded);
        let total_duration_ms = as_millis_f64(total);

        let mean_latency_ms = if requested == 0 {
            0.0
        } else {
            total_duration_ms / f64::from(requested)
        };
        let throughput_per_sec = if total.is_zero() {
            0.0
        } else {
            f64::from(requested) / total.as_secs_f64()
        };

        let call_latencies: Vec<f64> = outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| o.latency_ms)
            .collect();
        let processing: Vec<f64> = outcomes
            .iter()
            .filter_map(|o| o.server_processing_ms)
            .map(|ms| ms as f64)
            .collect();

        Self {
            requested,
            succeeded,
            failed,
            total_duration_ms,
            mean_latency_ms,
            throughput_per_sec,
            min_call_latency_ms: call_latencies.iter().copied().reduce(f64::min),
            max_call_latency_ms: call_latencies.iter().copied().reduce(f64::max),
            mean_call_latency_ms: mean(&call_latencies),
            mean_server_processing_ms: mean(&processing),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded == self.requested
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Total requests:        {}", self.requested)?;
        writeln!(f, "  Succeeded:             {}", self.succeeded)?;
        writeln!(f, "  Failed:                {}", self.failed)?;
        writeln!(f, "  Total time:            {:.0}ms", self.total_duration_ms)?;
        writeln!(f, "  Mean time per request: {:.2}ms", self.mean_latency_ms)?;
        write!(f, "  Requests per second:   {:.2}", self.throughput_per_sec)?;
        if let (Some(min), Some(max), Some(mean)) = (
            self.min_call_latency_ms,
            self.max_call_latency_ms,
            self.mean_call_latency_ms,
        ) {
            write!(
                f,
                "\n  Call latency:          min {min:.2}ms / mean {mean:.2}ms / max {max:.2}ms"
            )?;
        }
        if let Some(processing) = self.mean_server_processing_ms {
            write!(f, "\n  Server processing:     mean {processing:.2}ms")?;
        }
        Ok(())
    }
}

/// A finished stress test: the report plus the raw per-call outcomes it was
/// computed from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StressRun {
    pub target: String,
    pub report: AggregateReport,
    pub outcomes: Vec<StressOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl fmt::Display for StressRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stress test results ({}):", self.target)?;
        write!(f, "{}", self.report)
    }
}

/// Same batch size fired at the active and the standby slot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotComparison {
    pub active: StressRun,
    pub standby: StressRun,
}

impl SlotComparison {
    /// Standby throughput relative to active; `None` if active had none.
    pub fn throughput_ratio(&self) -> Option<f64> {
        let active = self.active.report.throughput_per_sec;
        (active > 0.0).then(|| self.standby.report.throughput_per_sec / active)
    }
}

impl fmt::Display for SlotComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[active] {}", self.active)?;
        writeln!(f, "[standby] {}", self.standby)?;
        match self.throughput_ratio() {
            Some(ratio) => write!(f, "Standby/active throughput: {ratio:.2}x"),
            None => write!(f, "Standby/active throughput: n/a"),
        }
    }
}

fn as_millis_f64(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
