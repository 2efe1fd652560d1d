//! # OS signal handling.
//!
//! When [`Config::handle_signals`](crate::Config::handle_signals) is set,
//! `Pool::start` spawns [`watch_signals`], which turns the first termination
//! signal into a regular `stop()`.
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio::{select, task::JoinHandle};

use crate::core::stop::StopController;
use crate::events::{Bus, Event, EventKind};

/// Spawns a watcher that requests stop on the first termination signal.
///
/// The watcher exits on its own once the pool is stopped by other means.
pub(crate) fn watch_signals(stop: StopController, bus: Bus) -> JoinHandle<()> {
    tokio::spawn(async move {
        select! {
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => {
                    bus.publish(Event::new(EventKind::ShutdownSignal));
                    stop.stop();
                }
                Err(e) => tracing::warn!(error = %e, "signal handler registration failed"),
            },
            _ = stop.stopped() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watcher_exits_when_stopped_elsewhere() {
        let bus = Bus::new(8);
        let stop = StopController::new(bus.clone());
        let handle = watch_signals(stop.clone(), bus);

        stop.stop();
        handle.await.unwrap();
    }
}
