//! The observer hook of the pool.
//!
//! Anything that wants to see enqueues, attempts, retries or the stop sequence
//! implements [`Subscribe`] and is attached with
//! [`PoolBuilder::with_subscriber`](crate::PoolBuilder::with_subscriber).
//! Each subscriber gets its own bounded queue and worker, so a slow one
//! never holds up a worker slot. When its queue is full the event is dropped
//! for that subscriber and `SubscriberOverflow` is published instead.
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use async_trait::async_trait;
//! use workpool::{Event, EventKind, Subscribe};
//!
//! /// Counts tasks that used up their retries.
//! #[derive(Default)]
//! struct Exhausted(AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for Exhausted {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TaskExhausted {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "exhausted" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receives pool events on a dedicated worker.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per event, in publish order. A panic here is caught and
    /// reported as `SubscriberPanicked`; later events still arrive.
    async fn on_event(&self, event: &Event);

    /// Label used in overflow and panic events. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events buffered for this subscriber before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    #[async_trait]
    impl Subscribe for Quiet {
        async fn on_event(&self, _event: &Event) {}
    }

    #[test]
    fn defaults_name_the_type_and_buffer_a_thousand_events() {
        let q = Quiet;
        assert!(q.name().ends_with("Quiet"));
        assert_eq!(q.queue_capacity(), 1024);
    }
}
