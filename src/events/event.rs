//! # Runtime events emitted by the pool, dispatcher and worker slots.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Queue events**: observations of the pending queue (debug mode)
//! - **Slot events**: worker slot lifecycle (spawned, completed, retired)
//! - **Attempt events**: task execution flow (starting, succeeded, failed, retry, exhausted)
//! - **Shutdown events**: stop protocol and drain outcome
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! slot id, attempt number and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use workpool::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("upload")
//!     .with_slot(2)
//!     .with_attempt(1)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("upload"));
//! assert_eq!(ev.slot, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Queue events ===
    /// A task was enqueued (published only when `Config::debug` is set).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `queue_len`: pending tasks right after the push
    /// - `limit`: configured slot limit
    /// - `idle_sleep_ms`, `task_sleep_ms`: configured sleeps
    TaskEnqueued,

    // === Slot events ===
    /// A worker slot was spawned (initial seeding or replacement).
    ///
    /// Sets:
    /// - `slot`: slot id
    SlotSpawned,

    /// The dispatcher consumed a slot's completion token.
    ///
    /// Sets:
    /// - `slot`: slot id
    /// - `task`: task name
    /// - `attempt`: attempts used
    /// - `reason`: `"success"` or `"failure"`
    SlotCompleted,

    /// An idle slot observed the stop flag and exited without running a task.
    ///
    /// Sets:
    /// - `slot`: slot id
    SlotRetired,

    // === Attempt events ===
    /// A slot is starting an attempt.
    ///
    /// Sets:
    /// - `task`, `slot`
    /// - `attempt`: attempt number (1-based, per task)
    TaskStarting,

    /// The attempt succeeded.
    ///
    /// Sets:
    /// - `task`, `slot`, `attempt`
    TaskSucceeded,

    /// The attempt failed (error or caught panic).
    ///
    /// Sets:
    /// - `task`, `slot`, `attempt`
    /// - `reason`: failure message
    TaskFailed,

    /// The failed task will be executed again by the same slot.
    ///
    /// Sets:
    /// - `task`, `slot`
    /// - `attempt`: the attempt that just failed
    /// - `reason`: failure message
    RetryScheduled,

    /// The task failed on its last allowed attempt and was abandoned.
    ///
    /// Sets:
    /// - `task`, `slot`
    /// - `attempt`: total attempts used
    /// - `reason`: last failure message
    TaskExhausted,

    // === Shutdown events ===
    /// `stop()` was called.
    StopRequested,

    /// An OS termination signal was observed (`Config::handle_signals`).
    ShutdownSignal,

    /// The dispatch loop exited.
    ///
    /// Sets:
    /// - `live`: slots still running at that moment
    DispatcherStopped,

    /// Every outstanding slot finished within the grace period.
    AllSlotsDrained,

    /// Grace period exceeded; some slots were still running.
    ///
    /// Sets:
    /// - `live`: slots still running
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Worker slot id.
    pub slot: Option<u64>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Pending queue length.
    pub queue_len: Option<usize>,
    /// Configured slot limit.
    pub limit: Option<usize>,
    /// Live slot count.
    pub live: Option<usize>,
    /// Configured idle backoff in milliseconds (compact).
    pub idle_sleep_ms: Option<u32>,
    /// Configured post-attempt pause in milliseconds (compact).
    pub task_sleep_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            slot: None,
            attempt: None,
            reason: None,
            queue_len: None,
            limit: None,
            live: None,
            idle_sleep_ms: None,
            task_sleep_ms: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a worker slot id.
    #[inline]
    pub fn with_slot(mut self, slot: u64) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the pending queue length.
    #[inline]
    pub fn with_queue_len(mut self, len: usize) -> Self {
        self.queue_len = Some(len);
        self
    }

    /// Attaches the configured slot limit.
    #[inline]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Attaches the live slot count.
    #[inline]
    pub fn with_live(mut self, live: usize) -> Self {
        self.live = Some(live);
        self
    }

    /// Attaches both configured sleeps (stored as milliseconds).
    #[inline]
    pub fn with_sleeps(mut self, idle: Duration, task: Duration) -> Self {
        self.idle_sleep_ms = Some(compact_ms(idle));
        self.task_sleep_ms = Some(compact_ms(task));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
