use serde::{Deserialize, Serialize};

use super::defaults;

/// Policy safety monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Default revenue-drop fraction that counts as a breach.
    pub revenue_drop_threshold: f64,
    /// Default flow-drop fraction that counts as a breach.
    pub flow_drop_threshold: f64,
    /// A breach must persist this long before rollback.
    pub sustained_breach_secs: u64,
    /// Consecutive breach samples further apart than this restart the run.
    pub max_sample_gap_secs: u64,
    /// A change with no sustained breach after this long is confirmed.
    pub observation_window_secs: u64,
    /// Terminal records kept for inspection.
    pub closed_history_limit: usize,
    /// How often the sampling loop fetches performance samples.
    pub sampling_interval_secs: u64,
}

impl SafetyConfig {
    pub fn sustained_breach(&self) -> chrono::Duration {
        super::secs_to_duration(self.sustained_breach_secs)
    }

    pub fn max_sample_gap(&self) -> chrono::Duration {
        super::secs_to_duration(self.max_sample_gap_secs)
    }

    pub fn observation_window(&self) -> chrono::Duration {
        super::secs_to_duration(self.observation_window_secs)
    }

    pub fn sampling_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sampling_interval_secs)
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            revenue_drop_threshold: defaults::DEFAULT_REVENUE_DROP_THRESHOLD,
            flow_drop_threshold: defaults::DEFAULT_FLOW_DROP_THRESHOLD,
            sustained_breach_secs: defaults::DEFAULT_SUSTAINED_BREACH_SECS,
            max_sample_gap_secs: defaults::DEFAULT_MAX_SAMPLE_GAP_SECS,
            observation_window_secs: defaults::DEFAULT_OBSERVATION_WINDOW_SECS,
            closed_history_limit: defaults::DEFAULT_CLOSED_HISTORY_LIMIT,
            sampling_interval_secs: defaults::DEFAULT_SAMPLING_INTERVAL_SECS,
        }
    }
}
