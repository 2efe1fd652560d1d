//! Runtime core: dispatch and slot lifecycle.
//!
//! The public API from this module is [`Pool`] (with [`PoolBuilder`]),
//! [`Config`] and [`PoolState`].
//!
//! Internal modules:
//! - [`gate`]: counting gate and completion tokens;
//! - [`runner`]: executes one attempt, catches panics, publishes events;
//! - [`worker`]: one slot: dequeue with idle backoff, retry sub-loop, token;
//! - [`dispatcher`]: seeds slots and spawns one replacement per token;
//! - [`stop`]: cooperative stop flag;
//! - [`shutdown`]: optional OS signal watcher.

mod builder;
mod config;
mod dispatcher;
mod gate;
mod pool;
mod runner;
mod shutdown;
mod state;
mod stop;
mod worker;

pub use builder::PoolBuilder;
pub use config::Config;
pub use pool::Pool;
pub use state::PoolState;

pub(crate) use runner::panic_message;
