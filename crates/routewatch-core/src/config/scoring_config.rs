use serde::{Deserialize, Serialize};

use super::defaults;

/// Opportunity scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Channels with fewer failures in the window are not reported.
    pub min_failure_count: u64,
    /// Channels with a smaller missed-fee estimate are not reported.
    pub min_missed_fee_msat: u64,
    /// Default analysis window length.
    pub analysis_window_secs: u64,
    /// Default size of the top-N list.
    pub top_n: usize,
    /// Multiplier applied to the current rate when suggesting lower fees.
    pub fee_reduction_factor: f64,
    /// Floor for a suggested fee rate.
    pub min_suggested_fee_ppm: u32,
}

impl ScoringConfig {
    pub fn analysis_window(&self) -> chrono::Duration {
        super::secs_to_duration(self.analysis_window_secs)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_failure_count: defaults::DEFAULT_MIN_FAILURE_COUNT,
            min_missed_fee_msat: defaults::DEFAULT_MIN_MISSED_FEE_MSAT,
            analysis_window_secs: defaults::DEFAULT_ANALYSIS_WINDOW_SECS,
            top_n: defaults::DEFAULT_TOP_N,
            fee_reduction_factor: defaults::DEFAULT_FEE_REDUCTION_FACTOR,
            min_suggested_fee_ppm: defaults::DEFAULT_MIN_SUGGESTED_FEE_PPM,
        }
    }
}
