//! Guardrail evaluation and sustained-breach tracking.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use routewatch_core::models::{AppliedPolicyChange, PerformanceSample, RollbackReason};

/// What happened to a sample fed to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SampleOutcome {
    /// No active record with that id for the channel; terminal or unknown.
    Ignored,
    /// Out of order, duplicate, or before `applied_at`.
    Discarded,
    /// Evaluated; the record is still active.
    Pending { breaching: bool },
    RolledBack { reason: RollbackReason },
    Confirmed,
}

/// Fractional drop of `observed` relative to `baseline`. `None` when the
/// baseline is zero, which disables that guardrail.
pub fn drop_fraction(baseline: f64, observed: f64) -> Option<f64> {
    if baseline <= 0.0 || !observed.is_finite() {
        return None;
    }
    Some((baseline - observed) / baseline)
}

/// Guardrail check for one sample. Revenue is checked before flow.
pub fn evaluate(change: &AppliedPolicyChange, sample: &PerformanceSample) -> Option<RollbackReason> {
    if let Some(drop) = drop_fraction(change.baseline_revenue_rate, sample.revenue_rate) {
        if drop > change.rollback_threshold_revenue_drop_fraction {
            return Some(RollbackReason::RevenueDecline {
                drop_fraction: drop,
            });
        }
    }
    if let Some(drop) = drop_fraction(change.baseline_flow_rate, sample.flow_rate) {
        if drop > change.rollback_threshold_flow_drop_fraction {
            return Some(RollbackReason::FlowReduction {
                drop_fraction: drop,
            });
        }
    }
    None
}

/// Tracks the current run of consecutive breaching samples for one record.
///
/// A run survives only while every breaching sample follows the previous one
/// within `max_gap`. A clean sample or a wider gap resets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreachTracker {
    run_start: Option<DateTime<Utc>>,
    last_breach: Option<DateTime<Utc>>,
    last_sample: Option<DateTime<Utc>>,
}

impl BreachTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sample at `ts` would be processed (strictly after the last one).
    pub fn accepts(&self, ts: DateTime<Utc>) -> bool {
        self.last_sample.map_or(true, |last| ts > last)
    }

    /// Feed one in-order sample's verdict. Returns the reason once the breach
    /// has persisted for at least `sustained`.
    pub fn observe(
        &mut self,
        ts: DateTime<Utc>,
        verdict: Option<RollbackReason>,
        sustained: Duration,
        max_gap: Duration,
    ) -> Option<RollbackReason> {
        self.last_sample = Some(ts);
        let Some(reason) = verdict else {
            self.run_start = None;
            self.last_breach = None;
            return None;
        };

        match (self.run_start, self.last_breach) {
            (Some(start), Some(last)) if ts - last <= max_gap => {
                self.last_breach = Some(ts);
                if ts - start >= sustained {
                    return Some(reason);
                }
            }
            _ => {
                self.run_start = Some(ts);
                self.last_breach = Some(ts);
            }
        }
        None
    }

    /// Start of the current breach run, if any.
    pub fn run_start(&self) -> Option<DateTime<Utc>> {
        self.run_start
    }

    pub fn last_sample(&self) -> Option<DateTime<Utc>> {
        self.last_sample
    }
}
