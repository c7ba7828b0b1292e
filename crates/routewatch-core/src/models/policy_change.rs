use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChannelId, FeePolicy};
use crate::config::defaults;

/// Identifier of one applied policy change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(pub Uuid);

impl ChangeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a watched change. Everything except `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Active,
    /// A guardrail was breached for the sustained window; previous policy restored.
    RolledBack,
    /// The observation window elapsed without a sustained breach.
    Confirmed,
    /// A newer change for the same channel took over monitoring.
    Superseded,
}

impl ChangeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChangeStatus::Active)
    }
}

/// Why a change was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RollbackReason {
    RevenueDecline { drop_fraction: f64 },
    FlowReduction { drop_fraction: f64 },
}

/// A fee change reported as applied by an external actor, watched by the
/// safety monitor until it is rolled back, confirmed, or superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPolicyChange {
    pub change_id: ChangeId,
    pub channel_id: ChannelId,
    pub applied_at: DateTime<Utc>,
    pub previous_policy: FeePolicy,
    pub new_policy: FeePolicy,
    /// Pre-change revenue rate (msat/hour).
    pub baseline_revenue_rate: f64,
    /// Pre-change flow rate (msat/hour).
    pub baseline_flow_rate: f64,
    pub rollback_threshold_revenue_drop_fraction: f64,
    pub rollback_threshold_flow_drop_fraction: f64,
    pub status: ChangeStatus,
    pub closed_at: Option<DateTime<Utc>>,
    pub rollback_reason: Option<RollbackReason>,
}

impl AppliedPolicyChange {
    /// New `Active` record using the default rollback thresholds.
    pub fn new(
        channel_id: ChannelId,
        applied_at: DateTime<Utc>,
        previous_policy: FeePolicy,
        new_policy: FeePolicy,
        baseline_revenue_rate: f64,
        baseline_flow_rate: f64,
    ) -> Self {
        Self {
            change_id: ChangeId::new(),
            channel_id,
            applied_at,
            previous_policy,
            new_policy,
            baseline_revenue_rate,
            baseline_flow_rate,
            rollback_threshold_revenue_drop_fraction: defaults::DEFAULT_REVENUE_DROP_THRESHOLD,
            rollback_threshold_flow_drop_fraction: defaults::DEFAULT_FLOW_DROP_THRESHOLD,
            status: ChangeStatus::Active,
            closed_at: None,
            rollback_reason: None,
        }
    }

    pub fn with_thresholds(mut self, revenue_drop: f64, flow_drop: f64) -> Self {
        self.rollback_threshold_revenue_drop_fraction = revenue_drop;
        self.rollback_threshold_flow_drop_fraction = flow_drop;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ChangeStatus::Active
    }

    /// Move to a terminal status. No-op when already terminal.
    pub fn close(&mut self, status: ChangeStatus, at: DateTime<Utc>) {
        if self.status.is_terminal() || !status.is_terminal() {
            return;
        }
        self.status = status;
        self.closed_at = Some(at);
    }
}
