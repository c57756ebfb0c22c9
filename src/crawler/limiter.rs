//! Request spacing
//!
//! A [`RequestLimiter`] hands out request slots at least `interval` apart.
//! Slots are reserved synchronously, so the order of reservation fixes the
//! order of issuance even when the waiting tasks are scheduled out of order.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Spaces outbound requests by a fixed minimum interval
#[derive(Debug)]
pub struct RequestLimiter {
    interval: Duration,
    /// Earliest instant the next slot may start
    next_slot: Mutex<Option<Instant>>,
}

impl RequestLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Reserves the next request slot and returns the instant it opens
    ///
    /// The first reservation opens immediately; each later one opens
    /// `interval` after the previous slot.
    pub fn reserve(&self) -> Instant {
        let mut next = self
            .next_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let slot = match *next {
            Some(at) if at > now => at,
            _ => now,
        };
        *next = Some(slot + self.interval);
        slot
    }

    /// Waits for a reserved slot to open
    ///
    /// Returns `false` if the run was cancelled first.
    pub async fn wait_for(slot: Instant, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            () = tokio::time::sleep_until(slot) => true,
        }
    }

    /// Reserves a slot and waits for it
    ///
    /// Returns `false` if the run was cancelled first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> bool {
        if self.interval.is_zero() {
            return !cancel.is_cancelled();
        }
        let slot = self.reserve();
        Self::wait_for(slot, cancel).await
    }
}
