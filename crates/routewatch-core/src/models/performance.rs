use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observed channel performance over a short interval, as reported by the
/// performance-sample source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub timestamp: DateTime<Utc>,
    /// Fee revenue in msat per hour.
    pub revenue_rate: f64,
    /// Forwarded volume in msat per hour.
    pub flow_rate: f64,
}

impl PerformanceSample {
    pub fn new(timestamp: DateTime<Utc>, revenue_rate: f64, flow_rate: f64) -> Self {
        Self {
            timestamp,
            revenue_rate,
            flow_rate,
        }
    }
}
