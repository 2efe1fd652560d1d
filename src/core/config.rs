//! # Pool configuration.
//!
//! Provides [`Config`] centralized settings for the pool runtime.
//! The configuration is fixed when the pool is built; there is no way to
//! change it while the dispatcher is running.
//!
//! ## Sentinel values
//! - `task_sleep = 0s` → no pause after an attempt
//! - `grace = 0s` → `start()` does not wait for in-flight slots after stop

use std::time::Duration;

use crate::error::RuntimeError;

/// Global configuration for the pool runtime.
///
/// ## Field semantics
/// - `limit`: Maximum number of live worker slots (`1..=Config::MAX_LIMIT`)
/// - `idle_sleep`: Poll backoff for a slot that found the queue empty
/// - `task_sleep`: Pause after every execution attempt (`0s` = none)
/// - `retry_times`: Extra attempts after the first failure
/// - `debug`: Publish a `TaskEnqueued` observation on every enqueue
/// - `grace`: Drain wait after stop (`0s` = fire-and-forget)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `handle_signals`: Treat SIGINT/SIGTERM/SIGQUIT as `stop()`
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of worker slots alive at the same time.
    pub limit: usize,

    /// How long an idle slot sleeps before polling the queue again.
    pub idle_sleep: Duration,

    /// Pause applied after every attempt, successful or not.
    pub task_sleep: Duration,

    /// Number of re-executions allowed after the first failed attempt.
    ///
    /// A task is executed at most `1 + retry_times` times, so values up to
    /// `u32::MAX - 1` are accepted.
    pub retry_times: u32,

    /// Emit a queue observation event on every enqueue.
    pub debug: bool,

    /// Maximum time `start()` waits for outstanding slots once stopped.
    ///
    /// - `Duration::ZERO` → do not wait (slots finish detached)
    /// - `> 0` → wait, then return `RuntimeError::GraceExceeded` on timeout
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Listen for OS termination signals while `start()` runs.
    pub handle_signals: bool,
}

impl Config {
    /// Largest accepted `limit`; the completion channel cannot hold more tokens.
    pub const MAX_LIMIT: usize = tokio::sync::Semaphore::MAX_PERMITS;

    /// Checks the configuration before a pool is built.
    ///
    /// # Example
    /// ```
    /// use workpool::Config;
    ///
    /// let mut cfg = Config::default();
    /// assert!(cfg.validate().is_ok());
    ///
    /// cfg.limit = 0;
    /// assert!(cfg.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.limit == 0 {
            return Err(RuntimeError::InvalidConfig {
                reason: "limit must be at least 1".to_string(),
            });
        }
        if self.limit > Self::MAX_LIMIT {
            return Err(RuntimeError::InvalidConfig {
                reason: format!("limit must not exceed {}", Self::MAX_LIMIT),
            });
        }
        if self.retry_times == u32::MAX {
            return Err(RuntimeError::InvalidConfig {
                reason: "retry_times must be below u32::MAX".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the post-attempt pause as an `Option`.
    ///
    /// - `None` → no pause
    /// - `Some(d)` → sleep `d` after each attempt
    #[inline]
    pub fn task_pause(&self) -> Option<Duration> {
        if self.task_sleep == Duration::ZERO {
            None
        } else {
            Some(self.task_sleep)
        }
    }

    /// Returns the drain grace period as an `Option`.
    #[inline]
    pub fn drain_grace(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Maximum attempts a single task may receive (`1 + retry_times`).
    ///
    /// Saturates at `u32::MAX`; `validate()` rejects the one value where that matters.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.retry_times.saturating_add(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `limit = 1`
    /// - `idle_sleep = 1s`
    /// - `task_sleep = 0s` (no throttling)
    /// - `retry_times = 0` (single attempt)
    /// - `debug = false`
    /// - `grace = 0s` (fire-and-forget stop)
    /// - `bus_capacity = 1024`
    /// - `handle_signals = false`
    fn default() -> Self {
        Self {
            limit: 1,
            idle_sleep: Duration::from_secs(1),
            task_sleep: Duration::ZERO,
            retry_times: 0,
            debug: false,
            grace: Duration::ZERO,
            bus_capacity: 1024,
            handle_signals: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.limit, 1);
        assert_eq!(cfg.idle_sleep, Duration::from_secs(1));
        assert_eq!(cfg.task_pause(), None);
        assert_eq!(cfg.max_attempts(), 1);
        assert!(!cfg.debug);
        assert_eq!(cfg.drain_grace(), None);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let cfg = Config {
            limit: 0,
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.as_label(), "runtime_invalid_config");
    }

    #[test]
    fn limit_above_channel_capacity_is_rejected() {
        let cfg = Config {
            limit: Config::MAX_LIMIT + 1,
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.as_label(), "runtime_invalid_config");

        let cfg = Config {
            limit: usize::MAX >> 2,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            limit: Config::MAX_LIMIT,
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn retry_times_must_leave_room_for_the_first_attempt() {
        let cfg = Config {
            retry_times: u32::MAX,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            retry_times: u32::MAX - 1,
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_attempts(), u32::MAX);
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
