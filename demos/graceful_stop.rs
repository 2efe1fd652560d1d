//! # Example: graceful_stop
//!
//! Shows what `stop()` does to running and queued work, with a custom
//! subscriber counting what happened.
//!
//! Demonstrates how to:
//! - Implement [`Subscribe`] for your own bookkeeping.
//! - Let the pool react to Ctrl-C / SIGTERM via `Config::handle_signals`.
//! - Observe that in-flight tasks finish and queued tasks stay queued.
//! - Flush the subscriber with [`Pool::close_subscribers`] before reading its totals.
//!
//! ## Run
//! ```bash
//! cargo run --example graceful_stop
//! ```
//! Press Ctrl-C at any time, or wait for the timed stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use workpool::{Config, Event, EventKind, Pool, Subscribe};

#[derive(Default)]
struct Tally {
    started: AtomicUsize,
    completed: AtomicUsize,
    retired: AtomicUsize,
}

#[async_trait]
impl Subscribe for Tally {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::TaskStarting => {
                self.started.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::SlotCompleted => {
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::SlotRetired => {
                self.retired.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::StopRequested => println!("[tally] stop requested"),
            EventKind::ShutdownSignal => println!("[tally] OS signal received"),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "tally"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tally = Arc::new(Tally::default());
    let pool = Pool::builder(Config {
        limit: 2,
        idle_sleep: Duration::from_millis(25),
        handle_signals: true,
        grace: Duration::from_secs(5),
        ..Config::default()
    })
    .with_subscriber(tally.clone())
    .build()?;

    for i in 0..10 {
        pool.add_task_fn(format!("slow-{i}"), move || async move {
            println!("[slow-{i}] working");
            tokio::time::sleep(Duration::from_millis(400)).await;
            println!("[slow-{i}] finished");
            true
        });
    }

    let stopper = Arc::clone(&pool);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        stopper.stop();
    });

    // with a grace period, start() returns once every slot has exited
    pool.start().await?;
    pool.close_subscribers().await;

    println!(
        "attempts started={} completed={} retired={} still queued={}",
        tally.started.load(Ordering::Relaxed),
        tally.completed.load(Ordering::Relaxed),
        tally.retired.load(Ordering::Relaxed),
        pool.len(),
    );
    Ok(())
}
