//! Minimum spacing between generation calls against a shared provider.
//!
//! The last-call instant lives in one shared cell inside [`RateLimiter`];
//! clones share it, so every caller of a provider sees the same timestamp.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Waits until `min_delay` has passed since `last_call`.
///
/// Returns immediately when nothing was recorded yet or enough time has
/// already passed. Does not record anything itself.
pub async fn throttle(last_call: Option<Instant>, min_delay: Duration) {
    let Some(last_call) = last_call else {
        return;
    };
    let elapsed = last_call.elapsed();
    if elapsed < min_delay {
        let delay_needed = min_delay - elapsed;
        log::info!("Rate limit enforced - waiting {}ms", delay_needed.as_millis());
        tokio::time::sleep(delay_needed).await;
    }
    log::trace!("Rate limit check completed");
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    last_call: Arc<Mutex<Option<Instant>>>,
    min_delay: Duration,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            last_call: Arc::new(Mutex::new(None)),
            min_delay,
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub async fn last_call(&self) -> Option<Instant> {
        *self.last_call.lock().await
    }

    /// Waits out the delay without recording a call.
    pub async fn throttle(&self) {
        let last_call = self.last_call().await;
        throttle(last_call, self.min_delay).await;
    }

    pub async fn record(&self) {
        *self.last_call.lock().await = Some(Instant::now());
    }

    /// Waits, then records, holding the cell the whole time so concurrent
    /// callers queue behind each other instead of reading the same stale
    /// timestamp.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        throttle(*last_call, self.min_delay).await;
        *last_call = Some(Instant::now());
    }
}
