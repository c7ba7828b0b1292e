use serde::{Deserialize, Serialize};

use super::defaults;

/// Ingestion boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Bounded queue depth per event subscriber; full queues drop events.
    pub subscriber_queue_depth: usize,
    /// First reconnect delay (milliseconds).
    pub backoff_initial_ms: u64,
    /// Reconnect delay ceiling (milliseconds).
    pub backoff_max_ms: u64,
    /// Growth factor between attempts.
    pub backoff_multiplier: f64,
    /// Symmetric jitter as a fraction of the delay (0.2 = ±20%).
    pub backoff_jitter: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_depth: defaults::DEFAULT_SUBSCRIBER_QUEUE_DEPTH,
            backoff_initial_ms: defaults::DEFAULT_BACKOFF_INITIAL_MS,
            backoff_max_ms: defaults::DEFAULT_BACKOFF_MAX_MS,
            backoff_multiplier: defaults::DEFAULT_BACKOFF_MULTIPLIER,
            backoff_jitter: defaults::DEFAULT_BACKOFF_JITTER,
        }
    }
}
