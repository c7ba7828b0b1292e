//! SafetyMonitor: one active record per channel, bounded closed history.
//!
//! Each channel's active record sits behind its DashMap shard lock, which is
//! the unit of exclusion for sample evaluation and for supersede-on-submit.
//! Rollback instructions are delivered only after that lock is released.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use routewatch_core::config::SafetyConfig;
use routewatch_core::errors::SafetyError;
use routewatch_core::models::{
    AppliedPolicyChange, ChangeId, ChangeStatus, ChannelId, FeePolicy, PerformanceSample,
    PolicyInstruction, TimeRange,
};
use routewatch_core::traits::{IPerformanceSource, IPolicySink};
use routewatch_observability::tracing_setup::events;
use routewatch_observability::PipelineMetrics;

use crate::breach::{self, BreachTracker, SampleOutcome};

struct MonitoredChange {
    record: AppliedPolicyChange,
    tracker: BreachTracker,
}

pub struct SafetyMonitor {
    active: DashMap<ChannelId, MonitoredChange>,
    closed: Mutex<VecDeque<AppliedPolicyChange>>,
    config: SafetyConfig,
    sink: Arc<dyn IPolicySink>,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl SafetyMonitor {
    pub fn new(config: SafetyConfig, sink: Arc<dyn IPolicySink>) -> Self {
        Self {
            active: DashMap::new(),
            closed: Mutex::new(VecDeque::new()),
            config,
            sink,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Start watching `change`. An active record for the same channel is
    /// closed as `Superseded` without any rollback.
    pub fn submit(&self, mut change: AppliedPolicyChange) -> Result<ChangeId, SafetyError> {
        validate(&change)?;
        change.status = ChangeStatus::Active;
        change.closed_at = None;
        change.rollback_reason = None;

        let change_id = change.change_id;
        let channel_id = change.channel_id;
        let applied_at = change.applied_at;

        let previous = self.active.insert(
            channel_id,
            MonitoredChange {
                record: change,
                tracker: BreachTracker::new(),
            },
        );

        if let Some(MonitoredChange { mut record, .. }) = previous {
            if record.is_active() {
                record.close(ChangeStatus::Superseded, applied_at);
                events::change_superseded(channel_id, record.change_id, change_id);
            }
            self.push_closed(record);
        }
        tracing::debug!(channel_id = %channel_id, change_id = %change_id, "monitoring policy change");
        Ok(change_id)
    }

    /// Build a record with this monitor's configured thresholds and submit it.
    pub fn submit_change(
        &self,
        channel_id: ChannelId,
        applied_at: DateTime<Utc>,
        previous_policy: FeePolicy,
        new_policy: FeePolicy,
        baseline_revenue_rate: f64,
        baseline_flow_rate: f64,
    ) -> Result<ChangeId, SafetyError> {
        let change = AppliedPolicyChange::new(
            channel_id,
            applied_at,
            previous_policy,
            new_policy,
            baseline_revenue_rate,
            baseline_flow_rate,
        )
        .with_thresholds(
            self.config.revenue_drop_threshold,
            self.config.flow_drop_threshold,
        );
        self.submit(change)
    }

    /// Feed one performance sample for `change_id`.
    ///
    /// Samples for a terminal or unknown record are ignored. Samples at or
    /// before the last processed one, or before `applied_at`, are discarded.
    pub fn observe(
        &self,
        channel_id: ChannelId,
        change_id: ChangeId,
        sample: &PerformanceSample,
    ) -> SampleOutcome {
        let (outcome, closed) = {
            let Some(mut entry) = self.active.get_mut(&channel_id) else {
                return SampleOutcome::Ignored;
            };
            let MonitoredChange { record, tracker } = &mut *entry;
            if record.change_id != change_id || !record.is_active() {
                return SampleOutcome::Ignored;
            }
            if sample.timestamp < record.applied_at || !tracker.accepts(sample.timestamp) {
                return SampleOutcome::Discarded;
            }

            let verdict = breach::evaluate(record, sample);
            let breaching = verdict.is_some();
            let triggered = tracker.observe(
                sample.timestamp,
                verdict,
                self.config.sustained_breach(),
                self.config.max_sample_gap(),
            );

            if let Some(reason) = triggered {
                record.close(ChangeStatus::RolledBack, sample.timestamp);
                record.rollback_reason = Some(reason);
                (SampleOutcome::RolledBack { reason }, Some(record.clone()))
            } else if window_elapsed(record.applied_at, self.config.observation_window(), sample.timestamp) {
                record.close(ChangeStatus::Confirmed, sample.timestamp);
                (SampleOutcome::Confirmed, Some(record.clone()))
            } else {
                (SampleOutcome::Pending { breaching }, None)
            }
        };

        if let Some(record) = closed {
            self.finish(record);
        }
        outcome
    }

    /// Confirm every active record whose observation window has elapsed by
    /// `now`. Returns the confirmed change ids.
    pub fn tick(&self, now: DateTime<Utc>) -> Vec<ChangeId> {
        let window = self.config.observation_window();
        let mut due = Vec::new();
        for mut entry in self.active.iter_mut() {
            let record = &mut entry.value_mut().record;
            if record.is_active() && window_elapsed(record.applied_at, window, now) {
                record.close(ChangeStatus::Confirmed, now);
                due.push(record.clone());
            }
        }
        let confirmed = due.iter().map(|r| r.change_id).collect();
        for record in due {
            self.finish(record);
        }
        confirmed
    }

    /// Pull one sample per active record from `source` covering the last
    /// sampling interval, feed it, then [`tick`](Self::tick).
    ///
    /// A source with no data for the range is "no breach observed yet"; a
    /// source error is logged and that record is skipped this round.
    pub fn sample_all(
        &self,
        source: &dyn IPerformanceSource,
        now: DateTime<Utc>,
    ) -> Vec<(ChangeId, SampleOutcome)> {
        let interval = chrono::Duration::from_std(self.config.sampling_interval())
            .unwrap_or_else(|_| self.config.max_sample_gap());
        let targets: Vec<(ChannelId, ChangeId, DateTime<Utc>)> = self
            .active
            .iter()
            .filter(|e| e.record.is_active())
            .map(|e| (e.record.channel_id, e.record.change_id, e.record.applied_at))
            .collect();

        let mut outcomes = Vec::new();
        for (channel_id, change_id, applied_at) in targets {
            let start = now
                .checked_sub_signed(interval)
                .map_or(applied_at, |from| from.max(applied_at));
            let Ok(range) = TimeRange::new(start, now) else {
                continue;
            };
            match source.sample(channel_id, range) {
                Ok(Some(sample)) => {
                    outcomes.push((change_id, self.observe(channel_id, change_id, &sample)));
                }
                Ok(None) => {
                    tracing::debug!(channel_id = %channel_id, "no performance data for range");
                }
                Err(e) => {
                    tracing::warn!(channel_id = %channel_id, error = %e, "performance sample failed");
                }
            }
        }
        for change_id in self.tick(now) {
            outcomes.push((change_id, SampleOutcome::Confirmed));
        }
        outcomes
    }

    /// Look up a record by id, active or closed.
    pub fn get(&self, change_id: ChangeId) -> Option<AppliedPolicyChange> {
        if let Some(found) = self
            .active
            .iter()
            .find(|e| e.record.change_id == change_id)
            .map(|e| e.record.clone())
        {
            return Some(found);
        }
        self.closed_guard()
            .iter()
            .rev()
            .find(|r| r.change_id == change_id)
            .cloned()
    }

    pub fn active_for(&self, channel_id: ChannelId) -> Option<AppliedPolicyChange> {
        self.active
            .get(&channel_id)
            .filter(|e| e.record.is_active())
            .map(|e| e.record.clone())
    }

    pub fn active_changes(&self) -> Vec<AppliedPolicyChange> {
        self.active
            .iter()
            .filter(|e| e.record.is_active())
            .map(|e| e.record.clone())
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|e| e.record.is_active()).count()
    }

    /// Closed records, oldest first, capped at `closed_history_limit`.
    pub fn closed_changes(&self) -> Vec<AppliedPolicyChange> {
        self.closed_guard().iter().cloned().collect()
    }

    /// Move a terminal record out of the active map and act on its outcome.
    /// Called without any shard lock held.
    fn finish(&self, record: AppliedPolicyChange) {
        let removed = self
            .active
            .remove_if(&record.channel_id, |_, m| {
                m.record.change_id == record.change_id && !m.record.is_active()
            })
            .is_some();
        // If a newer submit already displaced it, that submit archived it.
        if removed {
            self.push_closed(record.clone());
        }

        match record.status {
            ChangeStatus::RolledBack => self.emit_rollback(&record),
            ChangeStatus::Confirmed => events::change_confirmed(record.channel_id, record.change_id),
            ChangeStatus::Active | ChangeStatus::Superseded => {}
        }
    }

    fn emit_rollback(&self, record: &AppliedPolicyChange) {
        let Some(reason) = record.rollback_reason else {
            return;
        };
        events::rollback_triggered(record.channel_id, record.change_id, &reason);
        if let Some(metrics) = &self.metrics {
            metrics.record_rollback();
        }
        let instruction = PolicyInstruction::Rollback {
            channel_id: record.channel_id,
            change_id: record.change_id,
            restore: record.previous_policy,
            reason,
        };
        if let Err(e) = self.sink.submit(instruction) {
            events::rollback_emit_failed(record.channel_id, record.change_id, &e.to_string());
            if let Some(metrics) = &self.metrics {
                metrics.record_rollback_sink_failure();
            }
        }
    }

    fn push_closed(&self, record: AppliedPolicyChange) {
        let mut closed = self.closed_guard();
        closed.push_back(record);
        while closed.len() > self.config.closed_history_limit {
            closed.pop_front();
        }
    }

    fn closed_guard(&self) -> std::sync::MutexGuard<'_, VecDeque<AppliedPolicyChange>> {
        self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate(change: &AppliedPolicyChange) -> Result<(), SafetyError> {
    for (metric, value) in [
        ("revenue", change.baseline_revenue_rate),
        ("flow", change.baseline_flow_rate),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(SafetyError::InvalidBaseline { metric, value });
        }
    }
    for (metric, value) in [
        ("revenue", change.rollback_threshold_revenue_drop_fraction),
        ("flow", change.rollback_threshold_flow_drop_fraction),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            return Err(SafetyError::InvalidThreshold { metric, value });
        }
    }
    Ok(())
}

/// True once `at` reaches `applied_at + window`. A window ending past the
/// representable range never elapses.
fn window_elapsed(
    applied_at: DateTime<Utc>,
    window: chrono::Duration,
    at: DateTime<Utc>,
) -> bool {
    applied_at
        .checked_add_signed(window)
        .is_some_and(|end| at >= end)
}
