//! Health summary derived from pipeline counters.
//!
//! - rollback instructions failing to reach the sink → unhealthy
//! - rejection rate above 10% or any subscriber drops → degraded

use serde::{Deserialize, Serialize};

use crate::metrics::PipelineMetricsSnapshot;

const REJECTION_RATE_DEGRADED: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineHealth {
    pub status: HealthStatus,
    pub reasons: Vec<String>,
}

/// Evaluate overall pipeline health. The worst individual finding wins.
pub fn evaluate_health(snapshot: &PipelineMetricsSnapshot) -> PipelineHealth {
    let mut status = HealthStatus::Healthy;
    let mut reasons = Vec::new();

    if snapshot.rollback_sink_failures > 0 {
        status = status.max(HealthStatus::Unhealthy);
        reasons.push(format!(
            "{} rollback instruction(s) could not be delivered",
            snapshot.rollback_sink_failures
        ));
    }

    let rate = snapshot.rejection_rate();
    if rate > REJECTION_RATE_DEGRADED {
        status = status.max(HealthStatus::Degraded);
        reasons.push(format!("{:.1}% of forwarding records rejected", rate * 100.0));
    }

    let drops = snapshot.total_subscriber_drops();
    if drops > 0 {
        status = status.max(HealthStatus::Degraded);
        reasons.push(format!("{drops} event(s) dropped by lagging subscribers"));
    }

    PipelineHealth { status, reasons }
}
