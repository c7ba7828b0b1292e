use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

use super::{ChannelId, FailureCause, ForwardOutcome, ForwardingEvent, TimeRange};
use crate::constants::MSAT_PER_SAT;

/// Rolling per-channel aggregate: a fixed-capacity buffer of the most recent
/// events plus cumulative counters that survive buffer eviction.
///
/// Invariants:
/// - `recent_events().len() <= capacity()`
/// - `total_failures() == failure_breakdown().values().sum()`
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFailureStats {
    channel_id: ChannelId,
    capacity: usize,
    recent_events: VecDeque<ForwardingEvent>,
    total_failures: u64,
    total_successes: u64,
    total_missed_fee_msat: u64,
    total_missed_amount_msat: u64,
    total_fee_earned_msat: u64,
    failure_breakdown: BTreeMap<FailureCause, u64>,
    first_seen: DateTime<Utc>,
    last_failure: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
}

impl ChannelFailureStats {
    /// Create an empty aggregate. A zero capacity is raised to one.
    pub fn new(channel_id: ChannelId, capacity: usize, first_seen: DateTime<Utc>) -> Self {
        let capacity = capacity.max(1);
        Self {
            channel_id,
            capacity,
            recent_events: VecDeque::with_capacity(capacity),
            total_failures: 0,
            total_successes: 0,
            total_missed_fee_msat: 0,
            total_missed_amount_msat: 0,
            total_fee_earned_msat: 0,
            failure_breakdown: BTreeMap::new(),
            first_seen,
            last_failure: None,
            last_success: None,
        }
    }

    /// Apply one event. `missed_fee_msat` is the fee estimate for a failed
    /// attempt and is ignored for successes.
    pub fn record(&mut self, event: ForwardingEvent, missed_fee_msat: u64) {
        let ts = event.timestamp;
        match event.outcome {
            ForwardOutcome::Success => {
                self.total_successes += 1;
                self.total_fee_earned_msat = self.total_fee_earned_msat.saturating_add(event.fee_msat);
                self.last_success = Some(self.last_success.map_or(ts, |prev| prev.max(ts)));
            }
            ForwardOutcome::Failure(cause) => {
                self.total_failures += 1;
                *self.failure_breakdown.entry(cause).or_insert(0) += 1;
                self.total_missed_fee_msat = self.total_missed_fee_msat.saturating_add(missed_fee_msat);
                self.total_missed_amount_msat =
                    self.total_missed_amount_msat.saturating_add(event.amount_msat);
                self.last_failure = Some(self.last_failure.map_or(ts, |prev| prev.max(ts)));
            }
        }
        if ts < self.first_seen {
            self.first_seen = ts;
        }

        if self.recent_events.len() == self.capacity {
            self.recent_events.pop_front();
        }
        self.recent_events.push_back(event);
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffered events, oldest first, in arrival order.
    pub fn recent_events(&self) -> &VecDeque<ForwardingEvent> {
        &self.recent_events
    }

    /// Buffered events whose timestamp falls inside `range`.
    pub fn events_in(&self, range: TimeRange) -> impl Iterator<Item = &ForwardingEvent> + '_ {
        self.recent_events
            .iter()
            .filter(move |e| range.contains(e.timestamp))
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    pub fn total_successes(&self) -> u64 {
        self.total_successes
    }

    pub fn total_missed_fee_msat(&self) -> u64 {
        self.total_missed_fee_msat
    }

    pub fn total_missed_amount_msat(&self) -> u64 {
        self.total_missed_amount_msat
    }

    pub fn total_fee_earned_msat(&self) -> u64 {
        self.total_fee_earned_msat
    }

    pub fn failure_breakdown(&self) -> &BTreeMap<FailureCause, u64> {
        &self.failure_breakdown
    }

    pub fn first_seen(&self) -> DateTime<Utc> {
        self.first_seen
    }

    pub fn last_failure(&self) -> Option<DateTime<Utc>> {
        self.last_failure
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    /// Most recent failure or success, falling back to `first_seen`.
    pub fn last_activity(&self) -> DateTime<Utc> {
        match (self.last_failure, self.last_success) {
            (Some(f), Some(s)) => f.max(s),
            (Some(f), None) => f,
            (None, Some(s)) => s,
            (None, None) => self.first_seen,
        }
    }

    /// True when both the last failure and the last success are older than
    /// `now - idle_horizon`. A horizon reaching past the earliest
    /// representable instant never expires anything.
    pub fn is_idle(&self, now: DateTime<Utc>, idle_horizon: Duration) -> bool {
        now.checked_sub_signed(idle_horizon)
            .is_some_and(|cutoff| self.last_activity() < cutoff)
    }

    /// Lifetime failure rate over all recorded attempts (0.0 when empty).
    pub fn failure_rate(&self) -> f64 {
        let total = self.total_failures + self.total_successes;
        if total == 0 {
            return 0.0;
        }
        self.total_failures as f64 / total as f64
    }

    pub fn missed_fee_sat(&self) -> f64 {
        self.total_missed_fee_msat as f64 / MSAT_PER_SAT as f64
    }
}
