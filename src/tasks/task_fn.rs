//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! attempt. The future may resolve to `Result<(), TaskError>` or to a plain
//! `bool` (see [`TaskOutcome`]).
//!
//! ## Concurrency semantics
//! - Every attempt calls the closure again and gets a **new** future.
//! - No hidden mutation between attempts; shared state goes through an explicit `Arc<...>`.
//!
//! ## Example
//! ```rust
//! use workpool::{TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::arc("worker", || async move {
//!     // do work...
//!     Ok::<_, TaskError>(())
//! });
//! assert_eq!(t.name(), "worker");
//!
//! let flag: TaskRef = TaskFn::arc("probe", || async { true });
//! assert_eq!(flag.name(), "probe");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// Result shapes a [`TaskFn`] closure may resolve to.
pub trait TaskOutcome: Send {
    /// Converts the closure output into an attempt result.
    fn into_result(self) -> Result<(), TaskError>;
}

impl TaskOutcome for Result<(), TaskError> {
    #[inline]
    fn into_result(self) -> Result<(), TaskError> {
        self
    }
}

impl TaskOutcome for bool {
    #[inline]
    fn into_result(self) -> Result<(), TaskError> {
        if self {
            Ok(())
        } else {
            Err(TaskError::fail("task reported failure"))
        }
    }
}

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per attempt.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future + Send + 'static,
    Fut::Output: TaskOutcome,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), TaskError> {
        (self.f)().await.into_result()
    }
}
