//! Rate Limiter
//!
//! Bounds outbound planning calls to a quota per rolling window,
//! suspending the calling session (not the process) when the quota is
//! exceeded.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

/// Rolling-window rate limiter, scoped to one planner session.
///
/// The first call starts the window. Up to `quota` calls inside the
/// window proceed immediately; the call after that awaits the remainder
/// of the window, then the window restarts with that call counted.
/// Induced delay is latency, never an error.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    quota: u32,
    window_start: Option<Instant>,
    count: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, quota: u32) -> Self {
        Self {
            window,
            quota,
            window_start: None,
            count: 0,
        }
    }

    /// Account for one outbound call, sleeping first if the quota for
    /// the current window is already spent.
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        let start = match self.window_start {
            Some(start) => start,
            None => {
                self.window_start = Some(now);
                self.count = 1;
                debug!(count = 1, elapsed_secs = 0u64, "rate limiter window opened");
                return;
            }
        };

        self.count += 1;
        let elapsed = now.duration_since(start);
        debug!(
            count = self.count,
            elapsed_secs = elapsed.as_secs(),
            "rate limiter check"
        );

        if self.count > self.quota {
            if let Some(delay) = self.window.checked_sub(elapsed) {
                debug!(delay_secs = delay.as_secs(), "rate quota exhausted, sleeping");
                sleep(delay).await;
            }
            self.window_start = Some(Instant::now());
            self.count = 1;
        }
    }

    /// Calls spent in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }
}
