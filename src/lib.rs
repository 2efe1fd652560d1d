//! # workpool
//!
//! **Workpool** is a bounded-concurrency task pool for tokio.
//!
//! Producers push tasks into a FIFO queue; the pool runs them with at most
//! `limit` live worker slots, applying idle backoff when the queue is empty,
//! an optional pause after every attempt, bounded in-place retry, and a
//! cooperative stop that lets in-flight work finish without dispatching more.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   add_task(A)   add_task(B)   add_task(C)
//!        │             │             │
//!        ▼             ▼             ▼
//! ┌───────────────────────────────────────────────┐
//! │ TaskQueue (FIFO, mutex)                       │
//! └──────┬──────────────────┬──────────────────┬──┘
//!        ▼ dequeue          ▼ dequeue          ▼ dequeue
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │  Slot 1  │       │  Slot 2  │       │  Slot L  │   at most `limit` alive
//!   │ (retry)  │       │ (retry)  │       │ (retry)  │
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘
//!        │ Completion       │ Completion       │ Completion
//!        ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────┐
//! │ Dispatcher (gate: one replacement per token)  │
//! └───────────────────────────────────────────────┘
//!
//! Every component publishes Events ──► Bus ──► SubscriberSet ──► Subscribe impls
//! ```
//!
//! ### Slot lifecycle
//! ```text
//! spawned ──► poll queue ──empty──► sleep(idle_sleep) ──► poll queue ...
//!                │
//!                └─task──► attempt 1 ─fail─► attempt 2 ... ≤ 1 + retry_times
//!                             │ ok                │ exhausted
//!                             ▼                   ▼
//!                        sleep(task_sleep) after each attempt
//!                             ▼
//!                     completion token ──► dispatcher spawns a replacement
//!                                          (unless stopped)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                 |
//! |-------------------|--------------------------------------------------------------|------------------------------------|
//! | **Pool**          | Queue, dispatch loop, stop protocol.                         | [`Pool`], [`PoolBuilder`]          |
//! | **Tasks**         | Define tasks as trait objects or closures.                   | [`Task`], [`TaskFn`], [`TaskRef`]  |
//! | **Subscriber API**| Observe enqueue, attempts, retries and shutdown.             | [`Subscribe`], [`LogWriter`]       |
//! | **Errors**        | Typed errors for the runtime and for task attempts.          | [`RuntimeError`], [`TaskError`]    |
//! | **Configuration** | Limit, sleeps, retries, debug observation, drain grace.      | [`Config`]                         |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use workpool::{Config, LogWriter, Pool, Subscribe, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         limit: 4,
//!         idle_sleep: Duration::from_millis(20),
//!         retry_times: 2,
//!         debug: true,
//!         grace: Duration::from_secs(1),
//!         ..Config::default()
//!     };
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let pool = Pool::builder(cfg).with_subscribers(subs).build()?;
//!
//!     for i in 0..8 {
//!         pool.add_task(TaskFn::arc(format!("job-{i}"), move || async move {
//!             if i % 3 == 0 {
//!                 return Err(TaskError::fail("transient"));
//!             }
//!             Ok(())
//!         }));
//!     }
//!
//!     let stopper = Arc::clone(&pool);
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(100)).await;
//!         stopper.stop();
//!     });
//!
//!     pool.start().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod queue;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Config, Pool, PoolBuilder, PoolState};
pub use error::{RuntimeError, TaskError};
pub use events::{Event, EventKind};
pub use queue::TaskQueue;
pub use subscribers::{LogWriter, Subscribe, message_for};
pub use tasks::{Task, TaskFn, TaskOutcome, TaskRef};
