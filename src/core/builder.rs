use std::sync::Arc;

use tokio::{
    select,
    sync::broadcast::{
        Receiver,
        error::{RecvError, TryRecvError},
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{Config, Pool},
    error::RuntimeError,
    events::{Bus, Event},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Pool`] with optional subscribers.
pub struct PoolBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PoolBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (enqueue observations, attempts,
    /// retries, stop) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the configuration and builds the pool.
    ///
    /// Spawns the subscriber workers and the bus listener, so it must be
    /// called from within a tokio runtime.
    pub fn build(self) -> Result<Arc<Pool>, RuntimeError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = (!self.subscribers.is_empty()).then(|| {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            Listener::spawn(bus.subscribe(), set)
        });

        Ok(Arc::new(Pool::new_internal(self.cfg, bus, listener)))
    }
}

/// Handle to the task forwarding bus events to the subscriber set.
pub(crate) struct Listener {
    close: CancellationToken,
    handle: JoinHandle<()>,
}

impl Listener {
    fn spawn(mut rx: Receiver<Event>, set: SubscriberSet) -> Self {
        let close = CancellationToken::new();
        let token = close.clone();
        let handle = tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event listener lagged; events dropped");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => {
                        forward_buffered(&mut rx, &set);
                        break;
                    }
                }
            }
            set.shutdown().await;
        });
        Self { close, handle }
    }

    /// Asks the listener to forward what is buffered and wind down, without waiting.
    pub(crate) fn cancel(&self) {
        self.close.cancel();
    }

    /// Forwards what is already published, then waits until every subscriber
    /// has handled its queue.
    pub(crate) async fn close(self) {
        self.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "event listener ended abnormally");
        }
    }
}

fn forward_buffered(rx: &mut Receiver<Event>, set: &SubscriberSet) {
    loop {
        match rx.try_recv() {
            Ok(ev) => set.emit(&ev),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event listener lagged; events dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
