//! # Cooperative stop flag.
//!
//! [`StopController`] wraps a [`CancellationToken`] shared by the pool, the
//! dispatcher and every worker slot.
//!
//! ## Rules
//! - `stop()` never interrupts a running attempt, its retries or its `task_sleep`
//! - The dispatcher checks the flag before every replacement spawn
//! - Idle slots check it before every dequeue and while sleeping
//! - `stop()` is idempotent; `StopRequested` is published once
//! - Stopping before `start()` is allowed

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};

/// Shared stop flag with one-shot event publishing.
#[derive(Clone)]
pub(crate) struct StopController {
    token: CancellationToken,
    requested: Arc<AtomicBool>,
    bus: Bus,
}

impl StopController {
    pub fn new(bus: Bus) -> Self {
        Self {
            token: CancellationToken::new(),
            requested: Arc::new(AtomicBool::new(false)),
            bus,
        }
    }

    /// Sets the flag; only the first call publishes `StopRequested`.
    pub fn stop(&self) {
        if !self.requested.swap(true, Ordering::AcqRel) {
            self.bus.publish(Event::new(EventKind::StopRequested));
        }
        self.token.cancel();
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the flag is set.
    pub async fn stopped(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_is_idempotent_and_published_once() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let stop = StopController::new(bus.clone());
        let other = stop.clone();

        assert!(!stop.is_stopped());
        stop.stop();
        other.stop();
        assert!(other.is_stopped());
        other.stopped().await;

        bus.publish(Event::new(EventKind::DispatcherStopped));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::StopRequested);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::DispatcherStopped);
    }
}
