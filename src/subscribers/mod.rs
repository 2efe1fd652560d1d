//! # Event subscribers for the workpool runtime.
//!
//! This module provides the [`Subscribe`] trait, the internal `SubscriberSet` fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Slot/Dispatcher ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                                  │
//!                                                        ┌─────────┼─────────┐
//!                                                        ▼         ▼         ▼
//!                                                    LogWriter  Metrics   Custom
//! ```
//!
//! Subscribers replace inline debug printing: the pool itself never writes
//! to stdout/stderr, it only publishes events.

mod log;
mod set;
mod subscribe;

pub use log::{LogWriter, message_for};
pub(crate) use set::SubscriberSet;
pub use subscribe::Subscribe;
