//! # Logging subscriber.
//!
//! [`LogWriter`] renders pool events through [`tracing`], picking a level that
//! matches the event's severity. Install any `tracing` subscriber (for example
//! `tracing_subscriber::fmt`) in the application to see the output.
//!
//! ## Output (fmt layer)
//! ```text
//! DEBUG workpool: task enqueued task=upload queue_len=3 limit=2 idle_sleep_ms=1000 task_sleep_ms=0
//! DEBUG workpool: attempt starting task=upload slot=1 attempt=1
//!  WARN workpool: attempt failed task=upload slot=1 attempt=1 reason="execution failed: boom"
//!  INFO workpool: retrying task task=upload slot=1 attempt=1
//!  WARN workpool: task abandoned after exhausting retries task=upload slot=1 attempts=2
//!  INFO workpool: stop requested
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        log_event(e);
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

/// Static description of an event kind.
#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::TaskEnqueued => "task enqueued",
        EventKind::SlotSpawned => "worker slot spawned",
        EventKind::SlotCompleted => "worker slot completed",
        EventKind::SlotRetired => "idle worker slot retired on stop",
        EventKind::TaskStarting => "attempt starting",
        EventKind::TaskSucceeded => "attempt succeeded",
        EventKind::TaskFailed => "attempt failed",
        EventKind::RetryScheduled => "retrying task",
        EventKind::TaskExhausted => "task abandoned after exhausting retries",
        EventKind::StopRequested => "stop requested",
        EventKind::ShutdownSignal => "shutdown signal received",
        EventKind::DispatcherStopped => "dispatcher stopped",
        EventKind::AllSlotsDrained => "all worker slots drained",
        EventKind::GraceExceeded => "grace exceeded; some slots still running",
        EventKind::SubscriberPanicked => "subscriber panicked while processing an event",
        EventKind::SubscriberOverflow => "event dropped for a subscriber",
    }
}

fn log_event(e: &Event) {
    let msg = message_for(e.kind);
    let task = e.task.as_deref().unwrap_or("unknown");
    let reason = e.reason.as_deref().unwrap_or("unknown");
    let slot = e.slot.unwrap_or(0);
    let attempt = e.attempt.unwrap_or(0);

    match e.kind {
        EventKind::TaskEnqueued => debug!(
            task,
            queue_len = e.queue_len.unwrap_or(0),
            limit = e.limit.unwrap_or(0),
            idle_sleep_ms = e.idle_sleep_ms.unwrap_or(0),
            task_sleep_ms = e.task_sleep_ms.unwrap_or(0),
            "{msg}"
        ),

        EventKind::SlotSpawned | EventKind::SlotRetired => trace!(slot, "{msg}"),
        EventKind::SlotCompleted => trace!(slot, task, attempt, outcome = reason, "{msg}"),

        EventKind::TaskStarting => debug!(task, slot, attempt, "{msg}"),
        EventKind::TaskSucceeded => debug!(task, slot, attempt, "{msg}"),
        EventKind::TaskFailed => warn!(task, slot, attempt, reason, "{msg}"),
        EventKind::RetryScheduled => info!(task, slot, attempt, reason, "{msg}"),
        EventKind::TaskExhausted => warn!(task, slot, attempts = attempt, reason, "{msg}"),

        EventKind::StopRequested | EventKind::ShutdownSignal | EventKind::AllSlotsDrained => {
            info!("{msg}")
        }
        EventKind::DispatcherStopped => info!(live = e.live.unwrap_or(0), "{msg}"),
        EventKind::GraceExceeded => warn!(live = e.live.unwrap_or(0), "{msg}"),

        EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
            error!(subscriber = task, reason, "{msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renders_every_kind_without_a_subscriber_installed() {
        let kinds = [
            EventKind::TaskEnqueued,
            EventKind::SlotSpawned,
            EventKind::SlotCompleted,
            EventKind::TaskFailed,
            EventKind::TaskExhausted,
            EventKind::GraceExceeded,
            EventKind::SubscriberOverflow,
        ];
        for kind in kinds {
            LogWriter::new().on_event(&Event::new(kind)).await;
        }
        assert_eq!(LogWriter.name(), "log-writer");
    }
}
