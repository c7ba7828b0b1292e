use serde::{Deserialize, Serialize};

use super::defaults;

/// Statistics store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Events retained per channel (N).
    pub event_buffer_capacity: usize,
    /// Hard ceiling on tracked channels; least-recently-active is evicted beyond it.
    pub max_channels: usize,
    /// Channels with no activity for this long are evicted.
    pub idle_horizon_secs: u64,
    /// How often the maintenance loop runs idle eviction.
    pub eviction_interval_secs: u64,
}

impl StatsConfig {
    pub fn idle_horizon(&self) -> chrono::Duration {
        super::secs_to_duration(self.idle_horizon_secs)
    }

    pub fn eviction_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.eviction_interval_secs)
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            event_buffer_capacity: defaults::DEFAULT_EVENT_BUFFER_CAPACITY,
            max_channels: defaults::DEFAULT_MAX_CHANNELS,
            idle_horizon_secs: defaults::DEFAULT_IDLE_HORIZON_SECS,
            eviction_interval_secs: defaults::DEFAULT_EVICTION_INTERVAL_SECS,
        }
    }
}
