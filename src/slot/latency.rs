use rand::Rng;
use std::time::Duration;

/// Draws the synthetic processing delay for `/stress` calls.
#[derive(Debug, Clone, Copy)]
pub struct LatencySimulator {
    max_delay_ms: u64,
}

impl LatencySimulator {
    pub fn new(max_delay_ms: u64) -> Self {
        Self { max_delay_ms }
    }

    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    /// Uniform whole milliseconds in `[0, max_delay_ms)`.
    pub fn draw(&self) -> Duration {
        if self.max_delay_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..self.max_delay_ms))
    }

    /// Suspends the calling task for a freshly drawn delay and returns it.
    /// Only the current task waits; the runtime keeps serving other requests.
    pub async fn simulate(&self) -> Duration {
        let delay = self.draw();
        tokio::time::sleep(delay).await;
        delay
    }
}

impl Default for LatencySimulator {
    fn default() -> Self {
        Self::new(50)
    }
}
