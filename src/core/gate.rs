//! # Concurrency gate.
//!
//! The gate sequences worker-slot spawning. It is not an entry semaphore:
//! the dispatcher seeds every slot up front and afterwards admits exactly one
//! replacement per completion token it receives.
//!
//! ```text
//!            admit() ──► SlotTicket{ id, done } ──► worker slot
//!   live += 1 ▲                                        │
//!             │                                        │ done.complete(Completion)
//!   live -= 1 └──────── recv() ◄── [mpsc, cap=limit] ◄─┘
//! ```
//!
//! ## Rules
//! - `live` is always in `[0, limit]`; `admit()` refuses when `live == limit`
//! - Each received token releases exactly one unit
//! - The channel capacity equals `limit`, so a finishing slot never waits to send

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

/// Completion token emitted by a worker slot when it finishes a task.
#[derive(Debug, Clone)]
pub(crate) struct Completion {
    /// Slot that finished.
    pub slot: u64,
    /// Task the slot executed.
    pub task: Arc<str>,
    /// Outcome of the last attempt. Never affects replacement spawning.
    pub success: bool,
    /// Attempts used (1..=1+retry_times).
    pub attempts: u32,
}

/// Sending half handed to one worker slot.
pub(crate) struct CompletionTx {
    tx: mpsc::Sender<Completion>,
}

impl CompletionTx {
    /// Emits the slot's token. A closed gate (dispatcher gone) is ignored.
    pub async fn complete(self, done: Completion) {
        let _ = self.tx.send(done).await;
    }
}

/// Permission to run one worker slot.
pub(crate) struct SlotTicket {
    pub id: u64,
    pub done: CompletionTx,
}

/// Counting gate owned by the dispatcher.
pub(crate) struct Gate {
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    limit: usize,
    live: usize,
    next_id: u64,
}

impl Gate {
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        let (tx, rx) = mpsc::channel(limit);
        Self {
            tx,
            rx,
            limit,
            live: 0,
            next_id: 1,
        }
    }

    /// Admits one more slot if fewer than `limit` are live.
    pub fn admit(&mut self) -> Option<SlotTicket> {
        if self.live >= self.limit {
            return None;
        }
        self.live += 1;
        let id = self.next_id;
        self.next_id += 1;
        Some(SlotTicket {
            id,
            done: CompletionTx {
                tx: self.tx.clone(),
            },
        })
    }

    /// Waits for the next completion token and releases one unit.
    ///
    /// Cancel safe: if the future is dropped before a token arrives, nothing is released.
    pub async fn recv(&mut self) -> Option<Completion> {
        let done = self.rx.recv().await?;
        self.release();
        Some(done)
    }

    /// Takes an already-buffered token without waiting.
    pub fn try_recv(&mut self) -> Option<Completion> {
        let done = self.rx.try_recv().ok()?;
        self.release();
        Some(done)
    }

    /// Slots admitted and not yet accounted for by a token.
    pub fn live(&self) -> usize {
        self.live
    }

    fn release(&mut self) {
        debug_assert!(self.live > 0, "completion token without a live slot");
        self.live = self.live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(slot: u64) -> Completion {
        Completion {
            slot,
            task: Arc::from("t"),
            success: true,
            attempts: 1,
        }
    }

    #[test]
    fn admit_stops_at_limit() {
        let mut gate = Gate::new(3);
        let ids: Vec<u64> = std::iter::from_fn(|| gate.admit()).map(|t| t.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(gate.live(), 3);
        assert!(gate.admit().is_none());
    }

    #[test]
    fn zero_limit_is_treated_as_one() {
        let mut gate = Gate::new(0);
        assert!(gate.admit().is_some());
        assert!(gate.admit().is_none());
    }

    #[test]
    fn oversized_limit_is_clamped_to_channel_capacity() {
        let mut gate = Gate::new(usize::MAX >> 2);
        assert_eq!(gate.limit, Semaphore::MAX_PERMITS);
        assert!(gate.admit().is_some());
    }

    #[tokio::test]
    async fn one_token_frees_exactly_one_slot() {
        let mut gate = Gate::new(2);
        let a = gate.admit().unwrap();
        let _b = gate.admit().unwrap();

        a.done.complete(token(a.id)).await;
        let done = gate.recv().await.unwrap();
        assert_eq!(done.slot, 1);
        assert_eq!(gate.live(), 1);

        let c = gate.admit().unwrap();
        assert_eq!(c.id, 3);
        assert!(gate.admit().is_none());
    }

    #[tokio::test]
    async fn try_recv_drains_buffered_tokens_only() {
        let mut gate = Gate::new(2);
        let a = gate.admit().unwrap();
        let _b = gate.admit().unwrap();
        assert!(gate.try_recv().is_none());

        a.done.complete(token(a.id)).await;
        assert_eq!(gate.try_recv().map(|d| d.slot), Some(1));
        assert!(gate.try_recv().is_none());
        assert_eq!(gate.live(), 1);
    }
}
