//! Dispatch pacer - spaces out when requests START.
//!
//! Strava's read limits are generous for a personal sync, but bursts of detail
//! and photo requests still trip them. Each request waits for its slot, and
//! slots are at least `interval` apart. The first request goes out immediately.

use log::debug;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct DispatchPacer {
    next_dispatch: Mutex<Option<Instant>>,
    dispatched_count: AtomicU32,
    interval: Duration,
}

impl DispatchPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            next_dispatch: Mutex::new(None),
            dispatched_count: AtomicU32::new(0),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of slots handed out so far.
    pub fn dispatched(&self) -> u32 {
        self.dispatched_count.load(Ordering::Relaxed)
    }

    /// Wait for our dispatch slot and return its sequence number (1-based).
    pub async fn wait_for_slot(&self) -> u32 {
        let (wait_duration, dispatch_num) = {
            let mut next = self.next_dispatch.lock().await;
            let now = Instant::now();

            let dispatch_at = match *next {
                Some(at) if at > now => at,
                _ => now,
            };

            // Reserve the next slot for the next caller
            *next = Some(dispatch_at + self.interval);

            let num = self.dispatched_count.fetch_add(1, Ordering::Relaxed) + 1;
            (dispatch_at - now, num)
        };

        // Wait outside the lock
        if !wait_duration.is_zero() {
            debug!(
                "[Dispatch #{}] Waiting {:?} for slot",
                dispatch_num, wait_duration
            );
            tokio::time::sleep(wait_duration).await;
        }

        dispatch_num
    }
}
