//! # Pending-task queue.
//!
//! [`TaskQueue`] is a FIFO of [`TaskRef`] guarded by a mutex. Producers push to
//! the tail, worker slots pop from the head. Dequeue never blocks: an empty
//! queue yields `None` and the caller backs off.
//!
//! ## Rules
//! - Enqueue and dequeue serialize on the same lock (FIFO, no double dispatch)
//! - A dequeued task is owned by exactly one slot
//! - `len()` is a snapshot; it may be stale by the time the caller reads it

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::tasks::TaskRef;

/// Thread-safe FIFO of pending tasks.
#[derive(Default)]
pub struct TaskQueue {
    inner: Mutex<VecDeque<TaskRef>>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task to the tail and returns the length right after the push.
    pub fn enqueue(&self, task: TaskRef) -> usize {
        let mut q = self.lock();
        q.push_back(task);
        q.len()
    }

    /// Removes and returns the head, or `None` if the queue is empty.
    pub fn dequeue(&self) -> Option<TaskRef> {
        self.lock().pop_front()
    }

    /// Number of pending tasks (advisory).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no task is pending (advisory).
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Push/pop cannot leave the deque half-updated, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, VecDeque<TaskRef>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
