//! Pipeline counters shared between ingestion, eviction, and the safety loop.
//!
//! Recording is cheap enough to sit on the ingestion path.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Live pipeline counters. Scalar counters are atomics; the keyed ones are
/// sharded `DashMap`s, so recording only ever takes a short per-shard lock.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    events_accepted: AtomicU64,
    rejected: DashMap<&'static str, u64>,
    subscriber_drops: DashMap<String, u64>,
    subscriber_errors: AtomicU64,
    channels_evicted: AtomicU64,
    opportunities_detected: AtomicU64,
    rollbacks_emitted: AtomicU64,
    rollback_sink_failures: AtomicU64,
    source_reconnects: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accepted(&self) {
        self.events_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a rejection under its `IngestionError::kind()` label.
    pub fn record_rejected(&self, kind: &'static str) {
        *self.rejected.entry(kind).or_insert(0) += 1;
    }

    /// Count a dropped event for `subscriber` and return its running total.
    pub fn record_subscriber_drop(&self, subscriber: &str) -> u64 {
        let mut entry = self.subscriber_drops.entry(subscriber.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn record_subscriber_error(&self) {
        self.subscriber_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evicted(&self, count: usize) {
        self.channels_evicted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_opportunities(&self, count: usize) {
        self.opportunities_detected
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_rollback(&self) {
        self.rollbacks_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rollback_sink_failure(&self) {
        self.rollback_sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect(&self) {
        self.source_reconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            taken_at: Utc::now(),
            events_accepted: self.events_accepted.load(Ordering::Relaxed),
            events_rejected: self
                .rejected
                .iter()
                .map(|r| (r.key().to_string(), *r.value()))
                .collect(),
            subscriber_drops: self
                .subscriber_drops
                .iter()
                .map(|r| (r.key().clone(), *r.value()))
                .collect(),
            subscriber_errors: self.subscriber_errors.load(Ordering::Relaxed),
            channels_evicted: self.channels_evicted.load(Ordering::Relaxed),
            opportunities_detected: self.opportunities_detected.load(Ordering::Relaxed),
            rollbacks_emitted: self.rollbacks_emitted.load(Ordering::Relaxed),
            rollback_sink_failures: self.rollback_sink_failures.load(Ordering::Relaxed),
            source_reconnects: self.source_reconnects.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`PipelineMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetricsSnapshot {
    pub taken_at: DateTime<Utc>,
    pub events_accepted: u64,
    /// Rejections keyed by error kind.
    pub events_rejected: BTreeMap<String, u64>,
    /// Dropped events keyed by subscriber name.
    pub subscriber_drops: BTreeMap<String, u64>,
    pub subscriber_errors: u64,
    pub channels_evicted: u64,
    pub opportunities_detected: u64,
    pub rollbacks_emitted: u64,
    pub rollback_sink_failures: u64,
    pub source_reconnects: u64,
}

impl PipelineMetricsSnapshot {
    pub fn total_rejected(&self) -> u64 {
        self.events_rejected.values().sum()
    }

    pub fn total_subscriber_drops(&self) -> u64 {
        self.subscriber_drops.values().sum()
    }

    /// Rejected / (accepted + rejected), 0.0 when nothing was seen.
    pub fn rejection_rate(&self) -> f64 {
        let rejected = self.total_rejected();
        let seen = self.events_accepted + rejected;
        if seen == 0 {
            return 0.0;
        }
        rejected as f64 / seen as f64
    }
}
