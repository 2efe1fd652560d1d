//! # Run a single attempt of a task.
//!
//! Executes one attempt of a [`Task`] inside a worker slot and publishes the
//! attempt's lifecycle events to [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! publish TaskStarting
//!   task.execute() → Ok(())   → publish TaskSucceeded
//!   task.execute() → Err(e)   → publish TaskFailed{ reason = e }
//!   task.execute() → panic!() → Err(Panicked) → publish TaskFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `TaskSucceeded` or `TaskFailed`
//! - A panic escaping `execute()` is caught and becomes an ordinary failed attempt
//! - The slot survives the panic and may retry the task

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    tasks::Task,
};

/// Executes attempt number `attempt` of `task` on `slot`.
pub(crate) async fn run_once<T: Task + ?Sized>(
    task: &T,
    slot: u64,
    attempt: u32,
    bus: &Bus,
) -> Result<(), TaskError> {
    bus.publish(
        Event::new(EventKind::TaskStarting)
            .with_task(task.name())
            .with_slot(slot)
            .with_attempt(attempt),
    );

    let res = match AssertUnwindSafe(task.execute()).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(TaskError::Panicked {
            reason: panic_message(payload.as_ref()),
        }),
    };

    let ev = match &res {
        Ok(()) => Event::new(EventKind::TaskSucceeded),
        Err(e) => Event::new(EventKind::TaskFailed).with_reason(e.to_string()),
    };
    bus.publish(ev.with_task(task.name()).with_slot(slot).with_attempt(attempt));
    res
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn success_publishes_starting_then_succeeded() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let task = TaskFn::new("ok", || async { true });

        run_once(&task, 4, 1, &bus).await.unwrap();

        let starting = rx.recv().await.unwrap();
        assert_eq!(starting.kind, EventKind::TaskStarting);
        assert_eq!(starting.slot, Some(4));
        let done = rx.recv().await.unwrap();
        assert_eq!(done.kind, EventKind::TaskSucceeded);
        assert_eq!(done.attempt, Some(1));
    }

    #[tokio::test]
    async fn panic_becomes_failed_attempt() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let task = TaskFn::new("bomb", || async {
            if true {
                panic!("kaboom {}", 7);
            }
            true
        });

        let err = run_once(&task, 1, 2, &bus).await.unwrap_err();
        assert_eq!(err.as_label(), "task_panicked");
        assert_eq!(err.to_string(), "task panicked: kaboom 7");

        let _starting = rx.recv().await.unwrap();
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TaskFailed);
        assert_eq!(failed.reason.as_deref(), Some("task panicked: kaboom 7"));
    }

    #[test]
    fn unknown_payload_is_labelled() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
