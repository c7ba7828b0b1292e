//! The ingestion loop: pull raw records from an [`IEventSource`], validate,
//! classify, apply to the statistics store, and fan out to subscribers.
//! Reconnects with backoff and stops cleanly on shutdown.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use routewatch_core::errors::IngestionError;
use routewatch_core::models::{CausalCategory, ClassifiedEvent};
use routewatch_core::traits::IEventSink;
use routewatch_observability::tracing_setup::events;
use routewatch_observability::PipelineMetrics;
use routewatch_opportunity::classify;
use routewatch_stats::BoundedStatsStore;

use crate::backoff::Backoff;
use crate::boundary::RawForwardingRecord;
use crate::fanout::Fanout;
use crate::shutdown::Shutdown;
use crate::source::IEventSource;

/// Counts for one [`IngestionPipeline::run`] invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub accepted: u64,
    pub rejected: u64,
    pub reconnects: u64,
}

pub struct IngestionPipeline {
    store: Arc<BoundedStatsStore>,
    fanout: Fanout,
    metrics: Arc<PipelineMetrics>,
}

impl IngestionPipeline {
    pub fn new(store: Arc<BoundedStatsStore>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            store,
            fanout: Fanout::new(Arc::clone(&metrics)),
            metrics,
        }
    }

    /// See [`Fanout::subscribe`].
    pub fn subscribe(&mut self, sink: Arc<dyn IEventSink>, depth: usize) {
        self.fanout.subscribe(sink, depth);
    }

    pub fn store(&self) -> &Arc<BoundedStatsStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Process one raw record synchronously. Rejections are logged and
    /// counted, and never reach the store or subscribers.
    pub fn ingest(
        &self,
        raw: RawForwardingRecord,
        received_at: DateTime<Utc>,
    ) -> Result<ClassifiedEvent, IngestionError> {
        let event = match raw.validate(received_at) {
            Ok(event) => event,
            Err(e) => {
                self.metrics.record_rejected(e.kind());
                events::event_rejected(e.kind(), &e.to_string());
                return Err(e);
            }
        };

        // Validation guarantees at least one channel id.
        let Some(channel_id) = event.attributed_channel() else {
            let e = IngestionError::MissingField {
                field: "channel_id",
            };
            self.metrics.record_rejected(e.kind());
            return Err(e);
        };
        let category = event.failure_cause().map(classify);
        if let (Some(CausalCategory::InsufficientLiquidity), Some(cause)) =
            (category, event.failure_cause())
        {
            events::liquidity_failure(channel_id, event.amount_msat, cause);
        }

        self.store.record(event.clone());
        self.metrics.record_accepted();

        let classified = ClassifiedEvent {
            channel_id,
            category,
            event,
        };
        self.fanout.publish(classified.clone());
        Ok(classified)
    }

    /// Drive `source` until `shutdown` fires. Source errors and end of
    /// stream trigger a reconnect after a backoff delay; a record received
    /// after reconnecting resets the backoff.
    pub async fn run<S: IEventSource>(
        &self,
        source: &mut S,
        mut backoff: Backoff,
        mut shutdown: Shutdown,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        tracing::info!(subscribers = self.fanout.len(), "ingestion loop started");

        loop {
            if shutdown.is_triggered() {
                break;
            }
            let next = tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                next = source.next_record() => next,
            };

            let reason = match next {
                Ok(Some(raw)) => {
                    backoff.reset();
                    match self.ingest(raw, Utc::now()) {
                        Ok(_) => summary.accepted += 1,
                        Err(_) => summary.rejected += 1,
                    }
                    continue;
                }
                Ok(None) => "event stream ended".to_string(),
                Err(e) => e.to_string(),
            };

            match self
                .reconnect(source, &mut backoff, &mut shutdown, reason)
                .await
            {
                Some(attempts) => summary.reconnects += attempts,
                None => break,
            }
        }

        tracing::info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            reconnects = summary.reconnects,
            "ingestion loop stopped"
        );
        summary
    }

    /// Stop accepting events, then drain subscriber queues.
    pub async fn shutdown(self) {
        self.fanout.shutdown().await;
    }

    /// Retry `source.reconnect()` with backoff until it succeeds. Returns
    /// the number of attempts, or `None` if shutdown fired first.
    async fn reconnect<S: IEventSource>(
        &self,
        source: &mut S,
        backoff: &mut Backoff,
        shutdown: &mut Shutdown,
        mut reason: String,
    ) -> Option<u64> {
        let mut attempts = 0u64;
        loop {
            let delay = backoff.next_delay();
            attempts += 1;
            events::source_reconnecting(
                backoff.attempt(),
                u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                &reason,
            );
            self.metrics.record_reconnect();

            tokio::select! {
                biased;
                _ = shutdown.wait() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            match source.reconnect().await {
                Ok(()) => {
                    tracing::info!(attempts, "event source reconnected");
                    return Some(attempts);
                }
                Err(e) => reason = e.to_string(),
            }
        }
    }
}
