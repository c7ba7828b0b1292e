//! Typed subscriber fan-out. Each [`IEventSink`] is driven from the blocking
//! pool behind a bounded queue, so a sink that sleeps or blocks never holds
//! an async worker. A full queue drops the event for that subscriber only,
//! and a failing sink never affects ingestion or other sinks.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use routewatch_core::models::ClassifiedEvent;
use routewatch_core::traits::IEventSink;
use routewatch_observability::tracing_setup::events;
use routewatch_observability::PipelineMetrics;

struct Subscriber {
    name: String,
    tx: mpsc::Sender<Arc<ClassifiedEvent>>,
    worker: JoinHandle<()>,
}

pub struct Fanout {
    subscribers: Vec<Subscriber>,
    metrics: Arc<PipelineMetrics>,
}

impl Fanout {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            subscribers: Vec::new(),
            metrics,
        }
    }

    /// Register a sink with a queue of `depth` events. Its worker runs on the
    /// current runtime's blocking pool until the queue closes.
    pub fn subscribe(&mut self, sink: Arc<dyn IEventSink>, depth: usize) {
        let (tx, mut rx) = mpsc::channel::<Arc<ClassifiedEvent>>(depth.max(1));
        let name = sink.name().to_string();
        let metrics = Arc::clone(&self.metrics);

        let worker = tokio::task::spawn_blocking(move || {
            while let Some(event) = rx.blocking_recv() {
                if let Err(e) = sink.accept(&event) {
                    metrics.record_subscriber_error();
                    tracing::warn!(
                        subscriber = sink.name(),
                        channel_id = %event.channel_id,
                        error = %e,
                        "subscriber failed to handle event"
                    );
                }
            }
        });

        tracing::debug!(subscriber = %name, depth, "subscriber registered");
        self.subscribers.push(Subscriber { name, tx, worker });
    }

    /// Offer `event` to every subscriber without waiting. Returns how many
    /// subscribers accepted it into their queue.
    pub fn publish(&self, event: ClassifiedEvent) -> usize {
        if self.subscribers.is_empty() {
            return 0;
        }
        let event = Arc::new(event);
        let mut delivered = 0;
        for sub in &self.subscribers {
            match sub.tx.try_send(Arc::clone(&event)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                    let dropped = self.metrics.record_subscriber_drop(&sub.name);
                    // Log the first drop and then at each power of two.
                    if dropped.is_power_of_two() {
                        events::subscriber_lagging(&sub.name, dropped);
                    }
                }
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn subscriber_names(&self) -> Vec<&str> {
        self.subscribers.iter().map(|s| s.name.as_str()).collect()
    }

    /// Close every queue and wait for the workers to drain what they hold.
    pub async fn shutdown(self) {
        for sub in self.subscribers {
            drop(sub.tx);
            if let Err(e) = sub.worker.await {
                tracing::warn!(subscriber = %sub.name, error = %e, "subscriber worker ended abnormally");
            }
        }
    }
}
