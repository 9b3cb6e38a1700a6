pub mod client;
pub mod report;
pub mod status;

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use client::{HarnessError, HttpSlotApi, SlotApi};
pub use report::{AggregateReport, SlotComparison, StressOutcome, StressRun};
pub use status::{LogSink, StatusSink, StatusView};

/// Hard ceiling on the fan-out of one stress test.
pub const MAX_REQUESTS: u32 = 1000;

/// Drives concurrent load and status polling against one slot.
pub struct LoadHarness {
    api: Arc<dyn SlotApi>,
    sink: Arc<dyn StatusSink>,
    max_requests: u32,
    auto_status: Mutex<Option<AutoStatusTask>>,
}

impl LoadHarness {
    pub fn new(api: Arc<dyn SlotApi>, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            api,
            sink,
            max_requests: MAX_REQUESTS,
            auto_status: Mutex::new(None),
        }
    }

    /// Lowers the accepted fan-out. Values above [`MAX_REQUESTS`] are capped.
    pub fn with_max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests.clamp(1, MAX_REQUESTS);
        self
    }

    pub fn target(&self) -> &str {
        self.api.target()
    }

    pub fn validate(&self, requested: u32) -> Result<(), HarnessError> {
        if requested < 1 || requested > self.max_requests {
            return Err(HarnessError::Validation {
                requested,
                max: self.max_requests,
            });
        }
        Ok(())
    }

    /// Fires `requested` concurrent `/stress` calls and waits for every one
    /// of them to settle before aggregating. A failed call becomes a failed
    /// outcome; it never cancels its siblings.
    pub async fn run_stress_test(&self, requested: u32) -> Result<StressRun, HarnessError> {
        self.validate(requested)?;
        info!(base_url = self.target(), requested, "starting stress test");

        let started_at = Utc::now();
        let clock = Instant::now();

        let mut calls = JoinSet::new();
        for _ in 0..requested {
            let api = Arc::clone(&self.api);
            calls.spawn(async move { timed_stress_call(api.as_ref()).await });
        }

        let mut outcomes = Vec::with_capacity(requested as usize);
        while let Some(joined) = calls.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                warn!(error = %e, "stress call task failed");
                StressOutcome::failure(Utc::now(), Duration::ZERO, e.to_string())
            });
            outcomes.push(outcome);
        }

        let elapsed = clock.elapsed();
        let report = AggregateReport::from_outcomes(requested, &outcomes, elapsed);
        info!(
            base_url = self.target(),
            requested = report.requested,
            succeeded = report.succeeded,
            failed = report.failed,
            total_ms = report.total_duration_ms,
            "stress test finished"
        );

        Ok(StressRun {
            target: self.target().to_string(),
            report,
            outcomes,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Polls `/status` once and renders the result. Never fails; an error
    /// becomes [`StatusView::Unreachable`].
    pub async fn check_status(&self) -> StatusView {
        let view = fetch_status(self.api.as_ref()).await;
        self.sink.render(&view);
        view
    }

    /// Polls status every `interval`, first poll one interval from now.
    /// Replaces any schedule already running on this harness.
    pub async fn start_auto_status_check(&self, interval: Duration) {
        self.stop_auto_status_check().await;

        let task = AutoStatusTask::spawn(
            Arc::clone(&self.api),
            Arc::clone(&self.sink),
            interval.max(Duration::from_millis(1)),
        );
        if let Some(stale) = self.auto_status.lock().replace(task) {
            stale.abort();
        }
    }

    /// Cancels the running schedule, if any. Once this returns no further
    /// poll is rendered.
    pub async fn stop_auto_status_check(&self) {
        let running = self.auto_status.lock().take();
        if let Some(task) = running {
            task.shutdown().await;
        }
    }

    pub fn auto_status_running(&self) -> bool {
        self.auto_status
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

impl Drop for LoadHarness {
    fn drop(&mut self) {
        if let Some(task) = self.auto_status.get_mut().take() {
            task.abort();
        }
    }
}

/// Runs the same batch against the active slot, then the standby slot.
/// Both sizes are validated before any call is made.
pub async fn compare_slots(
    active: &LoadHarness,
    standby: &LoadHarness,
    requested: u32,
) -> Result<SlotComparison, HarnessError> {
    active.validate(requested)?;
    standby.validate(requested)?;

    let active = active.run_stress_test(requested).await?;
    let standby = standby.run_stress_test(requested).await?;
    Ok(SlotComparison { active, standby })
}

async fn timed_stress_call(api: &dyn SlotApi) -> StressOutcome {
    let started_at = Utc::now();
    let clock = Instant::now();
    match api.stress().await {
        Ok(reply) => StressOutcome::success(started_at, clock.elapsed(), reply.processing_time_ms),
        Err(e) => {
            debug!(error = %e, "stress call failed");
            StressOutcome::failure(started_at, clock.elapsed(), e.to_string())
        }
    }
}

async fn fetch_status(api: &dyn SlotApi) -> StatusView {
    match api.status().await {
        Ok(status) => StatusView::Online(status),
        Err(e) => StatusView::Unreachable {
            reason: e.to_string(),
        },
    }
}

struct AutoStatusTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutoStatusTask {
    fn spawn(api: Arc<dyn SlotApi>, sink: Arc<dyn StatusSink>, period: Duration) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let view = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    view = fetch_status(api.as_ref()) => view,
                };
                if cancelled.is_cancelled() {
                    break;
                }
                sink.render(&view);
            }
            debug!("auto status check stopped");
        });

        Self { token, handle }
    }

    fn abort(&self) {
        self.token.cancel();
        self.handle.abort();
    }

    async fn shutdown(self) {
        self.abort();
        // a cancelled JoinError is the expected result here
        let _ = self.handle.await;
    }
}
