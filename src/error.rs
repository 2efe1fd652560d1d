//! Error types used by the workpool runtime and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the pool itself (configuration, lifecycle).
//! - [`TaskError`]: errors raised by a single task attempt.
//!
//! Both types provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the pool runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration rejected by [`Config::validate`](crate::Config::validate).
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// [`Pool::start`](crate::Pool::start) was called more than once.
    #[error("pool already started")]
    AlreadyStarted,

    /// Grace period was exceeded while waiting for in-flight slots after stop.
    #[error("drain timeout {grace:?} exceeded; {live} slot(s) still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of slots still alive when the grace period ran out.
        live: usize,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use workpool::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::AlreadyStarted.as_label(), "runtime_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig { .. } => "runtime_invalid_config",
            RuntimeError::AlreadyStarted => "runtime_already_started",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Errors produced by a task attempt.
///
/// Every variant is a failed attempt: the worker slot retries it while
/// `retry_times` allows and otherwise abandons the task.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task reported failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task panicked inside `execute()`; the panic was caught by the slot.
    #[error("task panicked: {reason}")]
    Panicked {
        /// Panic payload rendered as text.
        reason: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use workpool::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked {
                reason: "oops".into()
            }
            .as_label(),
            "task_panicked"
        );
        assert_eq!(
            RuntimeError::InvalidConfig {
                reason: "limit".into()
            }
            .as_label(),
            "runtime_invalid_config"
        );
    }

    #[test]
    fn grace_exceeded_message_mentions_live_slots() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(2),
            live: 3,
        };
        assert_eq!(
            err.to_string(),
            "drain timeout 2s exceeded; 3 slot(s) still running"
        );
    }
}
