//! BoundedStatsStore: concurrent per-channel aggregates with two memory
//! bounds, an idle horizon enforced by [`BoundedStatsStore::evict_idle`] and a
//! hard channel ceiling enforced on admission of a new channel.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use routewatch_core::config::StatsConfig;
use routewatch_core::models::{ChannelFailureStats, ChannelId, ForwardingEvent};
use routewatch_core::traits::{IChannelStatsReader, IFeePolicyLookup};
use routewatch_observability::tracing_setup::events;
use routewatch_observability::PipelineMetrics;

use crate::fee_estimate;
use crate::summary::StoreSummary;

/// Thread-safe statistics store keyed by channel.
///
/// Each aggregate sits behind its shard's lock, so a `record` for one channel
/// is never observed half-applied and distinct channels rarely contend.
pub struct BoundedStatsStore {
    channels: DashMap<ChannelId, ChannelFailureStats>,
    config: StatsConfig,
    fee_lookup: Option<Arc<dyn IFeePolicyLookup>>,
    metrics: Option<Arc<PipelineMetrics>>,
    /// Serializes admission of new channels so the ceiling holds under
    /// concurrent first events.
    admission: Mutex<()>,
}

impl BoundedStatsStore {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            channels: DashMap::new(),
            config,
            fee_lookup: None,
            metrics: None,
            admission: Mutex::new(()),
        }
    }

    /// Estimate missed fees from the channel's live fee policy instead of the
    /// fee offered by each failed HTLC.
    pub fn with_fee_lookup(mut self, lookup: Arc<dyn IFeePolicyLookup>) -> Self {
        self.fee_lookup = Some(lookup);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Apply one event to its attributed channel's aggregate.
    ///
    /// O(1) amortized. Admitting a new channel while at the ceiling first
    /// evicts the least-recently-active channel, which costs one scan.
    pub fn record(&self, event: ForwardingEvent) {
        let Some(channel_id) = event.attributed_channel() else {
            tracing::debug!("event without channel ids ignored by store");
            return;
        };

        // Collaborator call happens before any shard lock is taken.
        let missed = fee_estimate::missed_fee_msat(&event, self.fee_lookup.as_deref());

        let mut entry = match self.channels.get_mut(&channel_id) {
            Some(entry) => entry,
            None => {
                let _admit = self.admission.lock().unwrap_or_else(PoisonError::into_inner);
                if !self.channels.contains_key(&channel_id) {
                    self.enforce_ceiling();
                }
                let capacity = self.config.event_buffer_capacity;
                let first_seen = event.timestamp;
                self.channels
                    .entry(channel_id)
                    .or_insert_with(|| ChannelFailureStats::new(channel_id, capacity, first_seen))
            }
        };
        entry.record(event, missed);
    }

    /// Consistent copy of one channel's aggregate.
    pub fn get(&self, channel_id: ChannelId) -> Option<ChannelFailureStats> {
        self.channels.get(&channel_id).map(|r| r.clone())
    }

    /// Copies of every aggregate. Each copy is internally consistent; the set
    /// as a whole is not a single atomic cut.
    pub fn snapshot_all(&self) -> Vec<ChannelFailureStats> {
        self.channels.iter().map(|r| r.value().clone()).collect()
    }

    /// Drop every channel whose latest activity is older than `idle_horizon`.
    /// Returns how many were removed.
    pub fn evict_idle(&self, now: DateTime<Utc>, idle_horizon: Duration) -> usize {
        let mut evicted = 0usize;
        self.channels.retain(|_, stats| {
            let idle = stats.is_idle(now, idle_horizon);
            if idle {
                evicted += 1;
            }
            !idle
        });
        if evicted > 0 {
            events::channels_evicted(evicted, "idle", self.channels.len());
            if let Some(metrics) = &self.metrics {
                metrics.record_evicted(evicted);
            }
        }
        evicted
    }

    /// [`evict_idle`](Self::evict_idle) with the configured horizon.
    pub fn evict_idle_default(&self, now: DateTime<Utc>) -> usize {
        self.evict_idle(now, self.config.idle_horizon())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.channels.iter().map(|r| *r.key()).collect()
    }

    pub fn summary(&self) -> StoreSummary {
        let snapshot = self.snapshot_all();
        StoreSummary::from_stats(&snapshot)
    }

    /// Make room for one more channel. Caller holds the admission lock.
    fn enforce_ceiling(&self) {
        let mut evicted = 0usize;
        while self.channels.len() >= self.config.max_channels {
            let Some(victim) = self.least_recently_active() else {
                break;
            };
            if self.channels.remove(&victim).is_some() {
                evicted += 1;
            }
        }
        if evicted > 0 {
            events::channels_evicted(evicted, "ceiling", self.channels.len());
            if let Some(metrics) = &self.metrics {
                metrics.record_evicted(evicted);
            }
        }
    }

    fn least_recently_active(&self) -> Option<ChannelId> {
        self.channels
            .iter()
            .map(|r| (r.value().last_activity(), *r.key()))
            .min()
            .map(|(_, id)| id)
    }
}

impl IChannelStatsReader for BoundedStatsStore {
    fn get(&self, channel_id: ChannelId) -> Option<ChannelFailureStats> {
        BoundedStatsStore::get(self, channel_id)
    }

    fn snapshot_all(&self) -> Vec<ChannelFailureStats> {
        BoundedStatsStore::snapshot_all(self)
    }
}
