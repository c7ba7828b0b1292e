use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use routewatch_core::models::{OpportunityScore, RecommendedAction, TimeRange};

/// Serializable summary of one analysis pass. Rendering is left to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityReport {
    pub generated_at: DateTime<Utc>,
    pub window: TimeRange,
    pub channels_analyzed: usize,
    pub opportunity_count: usize,
    pub total_missed_fee_msat: u64,
    /// Sum of the per-channel monthly extrapolations.
    pub total_potential_monthly_msat: u64,
    pub by_action: BTreeMap<RecommendedAction, usize>,
    /// Ranked, truncated to the configured top-N.
    pub top: Vec<OpportunityScore>,
}

impl OpportunityReport {
    pub fn build(
        generated_at: DateTime<Utc>,
        window: TimeRange,
        channels_analyzed: usize,
        ranked: &[OpportunityScore],
        top_n: usize,
    ) -> Self {
        let mut by_action = BTreeMap::new();
        for s in ranked {
            *by_action.entry(s.recommended_action).or_insert(0) += 1;
        }
        Self {
            generated_at,
            window,
            channels_analyzed,
            opportunity_count: ranked.len(),
            total_missed_fee_msat: ranked
                .iter()
                .fold(0u64, |acc, s| acc.saturating_add(s.missed_fee_estimate_msat)),
            total_potential_monthly_msat: ranked
                .iter()
                .fold(0u64, |acc, s| acc.saturating_add(s.potential_monthly_revenue_msat)),
            by_action,
            top: ranked.iter().take(top_n).cloned().collect(),
        }
    }
}
