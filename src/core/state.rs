//! # Dispatcher lifecycle state.
//!
//! ```text
//! Init ──start()──► Running ──stop flag observed──► Stopping ──loop exits──► Terminal
//! ```
//!
//! Stored in an atomic so `Pool::state()` can be read from any thread while the
//! dispatcher runs.

use std::sync::atomic::{AtomicU8, Ordering};

/// Observable lifecycle state of a [`Pool`](crate::Pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PoolState {
    /// Built, `start()` not called yet.
    Init = 0,
    /// Slots seeded; the dispatcher consumes completion tokens and spawns replacements.
    Running = 1,
    /// Stop flag observed; buffered tokens are drained, nothing new is spawned.
    Stopping = 2,
    /// The dispatch loop has exited.
    Terminal = 3,
}

impl PoolState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => PoolState::Init,
            1 => PoolState::Running,
            2 => PoolState::Stopping,
            _ => PoolState::Terminal,
        }
    }
}

/// Shared, lock-free holder for [`PoolState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(PoolState::Init as u8))
    }

    pub fn get(&self) -> PoolState {
        PoolState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: PoolState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Moves `Init → Running`; returns `false` if the pool was started before.
    pub fn try_begin(&self) -> bool {
        self.0
            .compare_exchange(
                PoolState::Init as u8,
                PoolState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_succeeds_only_once() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), PoolState::Init);
        assert!(cell.try_begin());
        assert_eq!(cell.get(), PoolState::Running);
        assert!(!cell.try_begin());

        cell.set(PoolState::Terminal);
        assert!(!cell.try_begin());
        assert_eq!(cell.get(), PoolState::Terminal);
    }
}
