//! # Pool: bounded-concurrency task execution.
//!
//! The [`Pool`] owns the pending [`TaskQueue`], the event bus, the subscriber
//! listener and the stop flag. `start()` runs the dispatcher, which keeps at
//! most `limit` worker slots alive until `stop()` is called.
//!
//! ## High-level architecture
//! ```text
//! producers ── add_task() ──► TaskQueue (FIFO, mutex)
//!                                  ▲ dequeue
//!                                  │
//! start() ──► Dispatcher ──spawn──► Worker slot 1..limit
//!                 ▲                     │ run_once × (1 + retry_times)
//!                 │                     │ sleep(task_sleep) after each attempt
//!                 └──── Completion ─────┘  (one token per finished task)
//!
//! stop() ──► StopController (CancellationToken)
//!              ├─► Dispatcher: no more replacements, loop exits
//!              └─► idle slots: no more dequeues, retire
//!
//! events: Pool/Dispatcher/Slots ── publish ──► Bus ──► listener ──► subscriber workers
//! ```
//!
//! ## Shutdown
//! `stop()` is fire-and-forget: it never interrupts an attempt. `start()`
//! returns once the dispatcher has finished its bookkeeping. With
//! [`Config::grace`] set, `start()` additionally waits up to `grace` for the
//! slots that are still executing.
//!
//! Subscribers run on their own workers and may lag behind. Once the slots are
//! gone (`drained()`), `close_subscribers()` forwards every event published so
//! far and waits until each subscriber has handled it.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use workpool::{Config, Pool, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         limit: 2,
//!         idle_sleep: Duration::from_millis(10),
//!         retry_times: 1,
//!         grace: Duration::from_secs(5),
//!         ..Config::default()
//!     };
//!     let pool = Pool::new(cfg)?;
//!
//!     pool.add_task(TaskFn::arc("hello", || async {
//!         println!("hello from a slot");
//!         Ok::<_, TaskError>(())
//!     }));
//!
//!     let stopper = pool.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         stopper.stop();
//!     });
//!
//!     pool.start().await?;
//!     Ok(())
//! }
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time;
use tokio_util::task::TaskTracker;

use crate::{
    core::{
        builder::{Listener, PoolBuilder},
        config::Config,
        dispatcher::Dispatcher,
        shutdown,
        state::{PoolState, StateCell},
        stop::StopController,
    },
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    queue::TaskQueue,
    tasks::{TaskFn, TaskOutcome, TaskRef},
};

/// Bounded-concurrency task pool.
pub struct Pool {
    cfg: Config,
    queue: Arc<TaskQueue>,
    bus: Bus,
    listener: Mutex<Option<Listener>>,
    stop: StopController,
    tracker: TaskTracker,
    state: Arc<StateCell>,
}

impl Pool {
    /// Creates a builder for attaching subscribers.
    pub fn builder(cfg: Config) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    /// Builds a pool without subscribers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(cfg: Config) -> Result<Arc<Self>, RuntimeError> {
        PoolBuilder::new(cfg).build()
    }

    pub(crate) fn new_internal(cfg: Config, bus: Bus, listener: Option<Listener>) -> Self {
        Self {
            cfg,
            queue: Arc::new(TaskQueue::new()),
            stop: StopController::new(bus.clone()),
            bus,
            listener: Mutex::new(listener),
            tracker: TaskTracker::new(),
            state: Arc::new(StateCell::new()),
        }
    }

    /// Enqueues a task. Non-blocking; safe while the dispatcher runs.
    ///
    /// With `Config::debug` set, publishes a `TaskEnqueued` observation.
    pub fn add_task(&self, task: TaskRef) {
        let name = self.cfg.debug.then(|| Arc::<str>::from(task.name()));
        let len = self.queue.enqueue(task);

        if let Some(name) = name {
            self.bus.publish(
                Event::new(EventKind::TaskEnqueued)
                    .with_task(name)
                    .with_queue_len(len)
                    .with_limit(self.cfg.limit)
                    .with_sleeps(self.cfg.idle_sleep, self.cfg.task_sleep),
            );
        }
    }

    /// Enqueues a closure-backed task (see [`TaskFn`]).
    pub fn add_task_fn<F, Fut>(&self, name: impl Into<Cow<'static, str>>, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: TaskOutcome,
    {
        self.add_task(TaskFn::arc(name, f));
    }

    /// Spawns `limit` worker slots and runs the dispatch loop until stopped.
    ///
    /// Returns after the dispatcher's own bookkeeping is done. Slots still
    /// executing are not awaited unless `Config::grace` is non-zero.
    ///
    /// # Errors
    /// - [`RuntimeError::AlreadyStarted`] on a second call
    /// - [`RuntimeError::GraceExceeded`] if slots outlive the grace period
    pub async fn start(&self) -> Result<(), RuntimeError> {
        if !self.state.try_begin() {
            return Err(RuntimeError::AlreadyStarted);
        }

        let watcher = self
            .cfg
            .handle_signals
            .then(|| shutdown::watch_signals(self.stop.clone(), self.bus.clone()));

        Dispatcher::new(
            &self.cfg,
            Arc::clone(&self.queue),
            self.bus.clone(),
            self.stop.clone(),
            self.tracker.clone(),
            Arc::clone(&self.state),
        )
        .run()
        .await;

        if let Some(w) = watcher {
            w.abort();
        }
        self.tracker.close();

        match self.cfg.drain_grace() {
            None => Ok(()),
            Some(grace) => self.wait_with_grace(grace).await,
        }
    }

    /// Requests a graceful stop. Non-blocking and idempotent.
    ///
    /// Running attempts (and their retries) finish; no further slot is spawned
    /// and idle slots stop polling.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// True once `stop()` was called (or a signal was handled).
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Number of pending tasks (advisory).
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if no task is pending (advisory).
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Current dispatcher state.
    pub fn state(&self) -> PoolState {
        self.state.get()
    }

    /// Worker slots currently alive (idle or executing).
    pub fn live_slots(&self) -> usize {
        self.tracker.len()
    }

    /// Resolves once `start()` has returned and every slot has exited.
    pub async fn drained(&self) {
        self.tracker.wait().await
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Delivers every event published so far to the subscribers, then stops
    /// their workers.
    ///
    /// Call it after `start()` returned and `drained()` resolved; events
    /// published later are not delivered. Idempotent; a no-op without
    /// subscribers.
    pub async fn close_subscribers(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.close().await;
        }
    }

    async fn wait_with_grace(&self, grace: std::time::Duration) -> Result<(), RuntimeError> {
        match time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllSlotsDrained));
                Ok(())
            }
            Err(_elapsed) => {
                let live = self.tracker.len();
                self.bus
                    .publish(Event::new(EventKind::GraceExceeded).with_live(live));
                Err(RuntimeError::GraceExceeded { grace, live })
            }
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(listener) = listener.as_ref() {
            listener.cancel();
        }
    }
}
