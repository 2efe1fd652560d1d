//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: a named unit of work with a single
//! async [`execute`](Task::execute) operation that reports success or failure.
//! The common handle type is [`TaskRef`], an `Arc<dyn Task>` that the queue and
//! the worker slots pass around.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// # Shared handle to a task object.
///
/// This is the type stored in the queue and handed to worker slots.
pub type TaskRef = Arc<dyn Task>;

/// # Unit of work executed by a worker slot.
///
/// `execute` returns `Ok(())` on success and `Err(_)` on failure. A failed
/// attempt is retried in place by the same slot while the pool's
/// `retry_times` allows, so implementations must tolerate being executed up to
/// `1 + retry_times` times.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use workpool::{Task, TaskError};
///
/// struct Upload {
///     path: String,
/// }
///
/// #[async_trait]
/// impl Task for Upload {
///     fn name(&self) -> &str { &self.path }
///
///     async fn execute(&self) -> Result<(), TaskError> {
///         if self.path.is_empty() {
///             return Err(TaskError::fail("empty path"));
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name (used in events).
    fn name(&self) -> &str;

    /// Runs one attempt of the task.
    async fn execute(&self) -> Result<(), TaskError>;
}
