// Client-side request rate limiting.
//
// The Fluidra gateway throttles aggressively, so the client enforces a
// configurable requests-per-minute budget before anything leaves the
// process. Over-budget callers are delayed until the sliding window
// frees a slot -- requests are never dropped.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window rate limiter over a one-minute horizon.
///
/// `acquire()` suspends until a slot is available and records the call.
/// Uses `tokio::time::Instant` so tests can drive it with a paused
/// clock.
pub struct RateLimiter {
    max_per_minute: usize,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            max_per_minute: usize::try_from(max_per_minute.max(1)).unwrap_or(1),
            window: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait for a request slot, then claim it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let now = Instant::now();
                let mut window = self.window.lock().await;

                while window
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= WINDOW)
                {
                    window.pop_front();
                }

                if window.len() < self.max_per_minute {
                    window.push_back(now);
                    return;
                }

                let Some(oldest) = window.front().copied() else {
                    continue;
                };
                WINDOW - now.duration_since(oldest)
            };

            debug!(delay_ms = wait.as_millis(), "rate limit reached, delaying");
            tokio::time::sleep(wait).await;
        }
    }

    /// Number of calls recorded in the current window.
    pub async fn calls_in_window(&self) -> usize {
        let now = Instant::now();
        let mut window = self.window.lock().await;
        while window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= WINDOW)
        {
            window.pop_front();
        }
        window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn acquires_freely_under_budget() {
        let limiter = RateLimiter::new(10);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.calls_in_window().await, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_rather_than_drops_over_budget() {
        let limiter = RateLimiter::new(3);
        for _ in 0..3 {
            limiter.acquire().await;
        }

        // The fourth call must wait for the window to free a slot.
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn window_frees_slots_as_time_passes() {
        let limiter = RateLimiter::new(2);
        limiter.acquire().await;
        limiter.acquire().await;

        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;
        assert_eq!(limiter.calls_in_window().await, 0);

        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
