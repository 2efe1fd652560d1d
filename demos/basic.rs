//! # Example: basic
//!
//! A handful of jobs on a pool of three slots, some of them flaky.
//!
//! Demonstrates how to:
//! - Configure [`Config`] with a limit, idle backoff and retries.
//! - Attach the built-in [`LogWriter`] and route it through `tracing-subscriber`.
//! - Enqueue closure tasks with [`Pool::add_task_fn`].
//! - Stop the pool from another task and wait for in-flight work.
//!
//! ## Flow
//! ```text
//! add_task_fn() × 8 ──► TaskQueue
//! Pool::start()
//!     ├─► Dispatcher seeds 3 slots
//!     ├─► slot: dequeue ─► run_once ─► (retry) ─► completion token
//!     ├─► Dispatcher spawns one replacement per token
//!     └─► stop() ─► DispatcherStopped ─► grace wait ─► AllSlotsDrained
//! Pool::close_subscribers() ─► LogWriter has rendered every event
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use workpool::{Config, LogWriter, Pool, TaskError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = Config {
        limit: 3,
        idle_sleep: Duration::from_millis(50),
        task_sleep: Duration::from_millis(20),
        retry_times: 2,
        debug: true,
        grace: Duration::from_secs(2),
        ..Config::default()
    };
    let pool = Pool::builder(cfg)
        .with_subscriber(Arc::new(LogWriter))
        .build()?;

    for i in 0..8u32 {
        // every third job needs one retry before it succeeds
        let calls = Arc::new(AtomicU32::new(0));
        pool.add_task_fn(format!("job-{i}"), move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(100 + u64::from(i) * 10)).await;
                if i % 3 == 0 && n == 0 {
                    return Err(TaskError::fail("warming up"));
                }
                println!("[job-{i}] done on attempt {}", n + 1);
                Ok(())
            }
        });
    }

    let stopper = Arc::clone(&pool);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(800)).await;
        stopper.stop();
    });

    pool.start().await?;
    pool.close_subscribers().await;
    println!("pool stopped; {} task(s) left in queue", pool.len());
    Ok(())
}
