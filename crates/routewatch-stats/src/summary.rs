use std::collections::BTreeMap;

use routewatch_core::models::{ChannelFailureStats, FailureCause};
use serde::{Deserialize, Serialize};

/// Store-wide totals across every tracked channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub channels_tracked: usize,
    pub events_retained: usize,
    pub total_failures: u64,
    pub total_successes: u64,
    /// `(cause, count)` pairs ordered by cause. A list rather than a map so
    /// `FailureCause::Other(code)` survives JSON serialization.
    pub failures_by_cause: Vec<(FailureCause, u64)>,
    pub total_missed_fee_msat: u64,
    pub total_missed_volume_msat: u64,
}

impl StoreSummary {
    pub fn from_stats<'a>(stats: impl IntoIterator<Item = &'a ChannelFailureStats>) -> Self {
        let mut summary = StoreSummary::default();
        let mut by_cause: BTreeMap<FailureCause, u64> = BTreeMap::new();
        for s in stats {
            summary.channels_tracked += 1;
            summary.events_retained += s.recent_events().len();
            summary.total_failures += s.total_failures();
            summary.total_successes += s.total_successes();
            for (cause, count) in s.failure_breakdown() {
                *by_cause.entry(*cause).or_insert(0) += count;
            }
            summary.total_missed_fee_msat = summary
                .total_missed_fee_msat
                .saturating_add(s.total_missed_fee_msat());
            summary.total_missed_volume_msat = summary
                .total_missed_volume_msat
                .saturating_add(s.total_missed_amount_msat());
        }
        summary.failures_by_cause = by_cause.into_iter().collect();
        summary
    }

    /// Failures whose cause satisfies `pred`.
    pub fn failures_matching(&self, pred: impl Fn(FailureCause) -> bool) -> u64 {
        self.failures_by_cause
            .iter()
            .filter(|(cause, _)| pred(*cause))
            .map(|(_, n)| n)
            .sum()
    }
}
