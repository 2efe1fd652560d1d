//! # Worker slot: one task, executed with bounded retry.
//!
//! A slot is an ephemeral tokio task spawned by the dispatcher. It lives until
//! it has run exactly one task to completion (or observed the stop flag while
//! idle), then it hands a completion token back through the gate.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► stop flag set?            → publish SlotRetired, exit (no token)
//!   ├─► queue.dequeue()
//!   │     └─ None → sleep(idle_sleep) (interrupted by stop), continue
//!   └─► Some(task) → break
//! }
//! attempt = 0
//! loop {
//!   ├─► attempt += 1
//!   ├─► run_once(task) ──► TaskStarting / TaskSucceeded / TaskFailed
//!   ├─► Ok           → success
//!   ├─► Err, attempt < 1 + retry_times → publish RetryScheduled
//!   ├─► Err, otherwise                 → publish TaskExhausted
//!   ├─► sleep(task_sleep) if non-zero  (after every attempt)
//!   └─► continue only after RetryScheduled
//! }
//! done.complete(Completion{ slot, task, success, attempts })
//! ```
//!
//! ## Rules
//! - An unsuccessful dequeue never emits a token
//! - Retries happen in place; the task is never re-queued
//! - Retries are immediate apart from `task_sleep`
//! - The stop flag is not consulted once a task is dequeued

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};

use crate::{
    core::{
        gate::{Completion, CompletionTx},
        runner::run_once,
        stop::StopController,
    },
    events::{Bus, Event, EventKind},
    queue::TaskQueue,
    tasks::{Task, TaskRef},
};

/// Per-slot parameters taken from [`Config`](crate::Config).
#[derive(Clone, Copy, Debug)]
pub(crate) struct WorkerParams {
    /// Backoff between polls of an empty queue.
    pub idle_sleep: Duration,
    /// Optional pause after every attempt.
    pub task_pause: Option<Duration>,
    /// `1 + retry_times`.
    pub max_attempts: u32,
}

/// One worker slot.
pub(crate) struct Worker {
    pub slot: u64,
    pub params: WorkerParams,
    pub queue: Arc<TaskQueue>,
    pub bus: Bus,
    pub stop: StopController,
    pub done: CompletionTx,
}

impl Worker {
    /// Runs the slot until its task finishes or it retires on stop.
    pub async fn run(self) {
        let Some(task) = self.acquire().await else {
            self.bus
                .publish(Event::new(EventKind::SlotRetired).with_slot(self.slot));
            return;
        };

        let (success, attempts) = self.execute_with_retry(task.as_ref()).await;
        self.done
            .complete(Completion {
                slot: self.slot,
                task: Arc::from(task.name()),
                success,
                attempts,
            })
            .await;
    }

    /// Polls the queue with idle backoff; `None` once the stop flag is seen.
    async fn acquire(&self) -> Option<TaskRef> {
        loop {
            if self.stop.is_stopped() {
                return None;
            }
            if let Some(task) = self.queue.dequeue() {
                return Some(task);
            }
            if self.params.idle_sleep.is_zero() {
                tokio::task::yield_now().await;
                continue;
            }
            select! {
                _ = time::sleep(self.params.idle_sleep) => {}
                _ = self.stop.stopped() => return None,
            }
        }
    }

    /// Retry sub-loop. Returns the last outcome and the number of attempts used.
    async fn execute_with_retry(&self, task: &dyn Task) -> (bool, u32) {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let res = run_once(task, self.slot, attempt, &self.bus).await;

            let finished = match res {
                Ok(()) => Some(true),
                Err(e) => {
                    let exhausted = attempt >= self.params.max_attempts;
                    let kind = if exhausted {
                        EventKind::TaskExhausted
                    } else {
                        EventKind::RetryScheduled
                    };
                    self.bus.publish(
                        Event::new(kind)
                            .with_task(task.name())
                            .with_slot(self.slot)
                            .with_attempt(attempt)
                            .with_reason(e.to_string()),
                    );
                    exhausted.then_some(false)
                }
            };

            self.pause().await;
            if let Some(success) = finished {
                return (success, attempt);
            }
        }
    }

    async fn pause(&self) {
        if let Some(pause) = self.params.task_pause {
            time::sleep(pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::core::gate::Gate;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;

    fn params(max_attempts: u32, task_pause: Option<Duration>) -> WorkerParams {
        WorkerParams {
            idle_sleep: Duration::from_millis(10),
            task_pause,
            max_attempts,
        }
    }

    fn worker(gate: &mut Gate, queue: &Arc<TaskQueue>, bus: &Bus, p: WorkerParams) -> Worker {
        let ticket = gate.admit().unwrap();
        Worker {
            slot: ticket.id,
            params: p,
            queue: Arc::clone(queue),
            bus: bus.clone(),
            stop: StopController::new(bus.clone()),
            done: ticket.done,
        }
    }

    fn failing_n_times(name: &'static str, fails: u32, calls: &Arc<AtomicU32>) -> TaskRef {
        let calls = Arc::clone(calls);
        TaskFn::arc(name, move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n <= fails {
                    Err(TaskError::fail(format!("fail #{n}")))
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_task_gets_one_plus_retry_attempts() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let queue = Arc::new(TaskQueue::new());
        let calls = Arc::new(AtomicU32::new(0));
        queue.enqueue(failing_n_times("doomed", u32::MAX, &calls));

        let mut gate = Gate::new(1);
        worker(&mut gate, &queue, &bus, params(4, None)).run().await;

        let done = gate.recv().await.unwrap();
        assert!(!done.success);
        assert_eq!(done.attempts, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let mut retries = 0;
        let mut exhausted = 0;
        while let Ok(ev) = rx.try_recv() {
            match ev.kind {
                EventKind::RetryScheduled => retries += 1,
                EventKind::TaskExhausted => {
                    exhausted += 1;
                    assert_eq!(ev.attempt, Some(4));
                }
                _ => {}
            }
        }
        assert_eq!((retries, exhausted), (3, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_retry_stops_the_sub_loop() {
        let bus = Bus::new(64);
        let queue = Arc::new(TaskQueue::new());
        let calls = Arc::new(AtomicU32::new(0));
        queue.enqueue(failing_n_times("flaky", 1, &calls));

        let mut gate = Gate::new(1);
        worker(&mut gate, &queue, &bus, params(5, None)).run().await;

        let done = gate.recv().await.unwrap();
        assert!(done.success);
        assert_eq!(done.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn task_sleep_follows_every_attempt() {
        let bus = Bus::new(64);
        let queue = Arc::new(TaskQueue::new());
        let calls = Arc::new(AtomicU32::new(0));
        queue.enqueue(failing_n_times("flaky", 2, &calls));

        let mut gate = Gate::new(1);
        let w = worker(&mut gate, &queue, &bus, params(3, Some(Duration::from_millis(100))));

        let started = time::Instant::now();
        w.run().await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(310), "elapsed {elapsed:?}");
        assert!(gate.recv().await.unwrap().success);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_slot_waits_for_work() {
        let bus = Bus::new(64);
        let queue = Arc::new(TaskQueue::new());
        let mut gate = Gate::new(1);
        let w = worker(&mut gate, &queue, &bus, params(1, None));
        let handle = tokio::spawn(w.run());

        time::sleep(Duration::from_millis(55)).await;
        assert!(gate.try_recv().is_none(), "no token for an empty dequeue");

        let calls = Arc::new(AtomicU32::new(0));
        queue.enqueue(failing_n_times("late", 0, &calls));
        let done = gate.recv().await.unwrap();
        assert_eq!(done.task.as_ref(), "late");
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn idle_slot_retires_on_stop_without_token() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let queue = Arc::new(TaskQueue::new());
        let mut gate = Gate::new(1);
        let w = worker(&mut gate, &queue, &bus, params(1, None));
        let stop = w.stop.clone();
        let handle = tokio::spawn(w.run());

        time::sleep(Duration::from_millis(25)).await;
        stop.stop();
        handle.await.unwrap();

        assert!(gate.try_recv().is_none());
        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, [EventKind::StopRequested, EventKind::SlotRetired]);
    }
}
