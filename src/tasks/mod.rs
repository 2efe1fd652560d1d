//! # Task abstractions.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for implementing async units of work
//! - [`TaskFn`] - function-backed task implementation
//! - [`TaskOutcome`] - result shapes accepted from `TaskFn` closures
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::{TaskFn, TaskOutcome};
