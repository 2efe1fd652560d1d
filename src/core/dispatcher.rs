//! # Dispatcher: seeds the slot pool and replaces finished slots.
//!
//! ## Flow
//! ```text
//! state = Running
//! for _ in 0..limit: gate.admit() → spawn Worker        (SlotSpawned)
//!
//! loop select! (biased) {
//!   stop flag            → break
//!   gate.recv() → token  → SlotCompleted
//!                         ├─ stop flag set → break
//!                         └─ gate.admit() → spawn one replacement
//! }
//! state = Stopping
//! drain buffered tokens (SlotCompleted each)
//! publish DispatcherStopped{ live }
//! state = Terminal
//! ```
//!
//! ## Rules
//! - Exactly `limit` slots are spawned at start, regardless of queue occupancy
//! - One token in, at most one replacement out; `Gate` refuses beyond `limit`
//! - The token's success flag never influences spawning
//! - The loop does not wait for slots that are still executing; they finish
//!   detached and their tokens are discarded

use std::sync::Arc;

use tokio::select;
use tokio_util::task::TaskTracker;

use crate::{
    core::{
        config::Config,
        gate::{Completion, Gate, SlotTicket},
        state::{PoolState, StateCell},
        stop::StopController,
        worker::{Worker, WorkerParams},
    },
    events::{Bus, Event, EventKind},
    queue::TaskQueue,
};

/// Owns the gate for one `start()` call.
pub(crate) struct Dispatcher {
    pub limit: usize,
    pub params: WorkerParams,
    pub queue: Arc<TaskQueue>,
    pub bus: Bus,
    pub stop: StopController,
    pub tracker: TaskTracker,
    pub state: Arc<StateCell>,
}

impl Dispatcher {
    pub fn new(
        cfg: &Config,
        queue: Arc<TaskQueue>,
        bus: Bus,
        stop: StopController,
        tracker: TaskTracker,
        state: Arc<StateCell>,
    ) -> Self {
        Self {
            limit: cfg.limit,
            params: WorkerParams {
                idle_sleep: cfg.idle_sleep,
                task_pause: cfg.task_pause(),
                max_attempts: cfg.max_attempts(),
            },
            queue,
            bus,
            stop,
            tracker,
            state,
        }
    }

    /// Runs the dispatch loop until the stop flag is observed.
    pub async fn run(self) {
        let mut gate = Gate::new(self.limit);
        self.state.set(PoolState::Running);
        while let Some(ticket) = gate.admit() {
            self.spawn_slot(ticket, gate.live());
        }

        loop {
            select! {
                biased;
                _ = self.stop.stopped() => break,
                done = gate.recv() => {
                    let Some(done) = done else { break };
                    self.publish_completed(&done);
                    if self.stop.is_stopped() {
                        break;
                    }
                    if let Some(ticket) = gate.admit() {
                        self.spawn_slot(ticket, gate.live());
                    }
                }
            }
        }

        self.state.set(PoolState::Stopping);
        while let Some(done) = gate.try_recv() {
            self.publish_completed(&done);
        }
        self.bus.publish(
            Event::new(EventKind::DispatcherStopped).with_live(self.tracker.len()),
        );
        self.state.set(PoolState::Terminal);
    }

    fn spawn_slot(&self, ticket: SlotTicket, live: usize) {
        let worker = Worker {
            slot: ticket.id,
            params: self.params,
            queue: Arc::clone(&self.queue),
            bus: self.bus.clone(),
            stop: self.stop.clone(),
            done: ticket.done,
        };
        self.bus.publish(
            Event::new(EventKind::SlotSpawned)
                .with_slot(ticket.id)
                .with_live(live),
        );
        self.tracker.spawn(worker.run());
    }

    fn publish_completed(&self, done: &Completion) {
        let outcome = if done.success { "success" } else { "failure" };
        self.bus.publish(
            Event::new(EventKind::SlotCompleted)
                .with_slot(done.slot)
                .with_task(Arc::clone(&done.task))
                .with_attempt(done.attempts)
                .with_reason(outcome),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::tasks::TaskFn;

    fn dispatcher(cfg: &Config, queue: &Arc<TaskQueue>, bus: &Bus) -> (Dispatcher, StopController) {
        let stop = StopController::new(bus.clone());
        let d = Dispatcher::new(
            cfg,
            Arc::clone(queue),
            bus.clone(),
            stop.clone(),
            TaskTracker::new(),
            Arc::new(StateCell::new()),
        );
        (d, stop)
    }

    #[tokio::test(start_paused = true)]
    async fn seeds_limit_slots_and_replaces_each_completion() {
        let cfg = Config {
            limit: 2,
            idle_sleep: Duration::from_millis(10),
            ..Config::default()
        };
        let bus = Bus::new(256);
        let mut rx = bus.subscribe();
        let queue = Arc::new(TaskQueue::new());
        for i in 0..5 {
            queue.enqueue(TaskFn::arc(format!("t{i}"), || async { true }));
        }

        let (d, stop) = dispatcher(&cfg, &queue, &bus);
        let state = Arc::clone(&d.state);
        let tracker = d.tracker.clone();
        let handle = tokio::spawn(d.run());

        let mut seen = Vec::new();
        while seen.iter().filter(|k| **k == EventKind::SlotCompleted).count() < 5 {
            seen.push(rx.recv().await.unwrap().kind);
        }
        assert_eq!(state.get(), PoolState::Running);
        stop.stop();
        handle.await.unwrap();
        assert_eq!(state.get(), PoolState::Terminal);

        tracker.close();
        tracker.wait().await;
        while let Ok(ev) = rx.try_recv() {
            seen.push(ev.kind);
        }
        let count = |kind: EventKind| seen.iter().filter(|k| **k == kind).count();

        // 2 seeded + 5 replacements; the last two sit idle until stop.
        assert_eq!(count(EventKind::SlotSpawned), 7);
        assert_eq!(count(EventKind::SlotCompleted), 5);
        assert_eq!(count(EventKind::SlotRetired), 2);
        assert_eq!(count(EventKind::DispatcherStopped), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_run_spawns_only_the_initial_slots() {
        let cfg = Config {
            limit: 3,
            ..Config::default()
        };
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let queue = Arc::new(TaskQueue::new());
        queue.enqueue(TaskFn::arc("never", || async { true }));

        let (d, stop) = dispatcher(&cfg, &queue, &bus);
        let tracker = d.tracker.clone();
        stop.stop();
        d.run().await;

        tracker.close();
        tracker.wait().await;

        let mut spawned = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::SlotSpawned {
                spawned += 1;
            }
        }
        assert_eq!(spawned, 3);
        assert_eq!(queue.len(), 1, "a stopped pool must not dequeue");
    }
}
