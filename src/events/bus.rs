//! Broadcast channel carrying pool events.
//!
//! Slots, the dispatcher, the stop controller and the subscriber workers all
//! publish here. The pool's listener is the only long-lived receiver; when no
//! subscriber is attached nobody listens and `publish` drops the event.
//!
//! A receiver that falls more than `capacity` events behind loses the oldest
//! ones and is told how many through `RecvError::Lagged`.

use tokio::sync::broadcast;

use super::event::Event;

/// Publishing side of the event channel. Clones share one ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// `capacity` is raised to 1 if zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Never blocks, never fails.
    pub fn publish(&self, ev: Event) {
        // Err only means there is no receiver right now.
        let _ = self.tx.send(ev);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::RecvError;

    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn events_before_subscribe_are_not_replayed() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::StopRequested));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::SlotSpawned).with_slot(7));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SlotSpawned);
        assert_eq!(ev.slot, Some(7));
    }

    #[tokio::test]
    async fn slow_receiver_is_told_how_many_slot_events_it_missed() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for slot in 1..=5 {
            bus.publish(Event::new(EventKind::SlotCompleted).with_slot(slot));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap().slot, Some(4));
        assert_eq!(rx.recv().await.unwrap().slot, Some(5));
    }
}
