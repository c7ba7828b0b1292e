//! Cross-channel ranking and category views.

use std::cmp::Ordering;

use routewatch_core::models::{CausalCategory, OpportunityScore};

/// Urgency descending, then missed fee descending, then channel id ascending.
pub fn compare(a: &OpportunityScore, b: &OpportunityScore) -> Ordering {
    b.urgency_score
        .total_cmp(&a.urgency_score)
        .then_with(|| b.missed_fee_estimate_msat.cmp(&a.missed_fee_estimate_msat))
        .then_with(|| a.channel_id.cmp(&b.channel_id))
}

pub fn rank(scores: &mut [OpportunityScore]) {
    scores.sort_by(compare);
}

/// Ranked scores whose dominant category is `category`, order preserved.
pub fn by_category(scores: &[OpportunityScore], category: CausalCategory) -> Vec<OpportunityScore> {
    scores
        .iter()
        .filter(|s| s.dominant_category == Some(category))
        .cloned()
        .collect()
}

pub fn liquidity_opportunities(scores: &[OpportunityScore]) -> Vec<OpportunityScore> {
    by_category(scores, CausalCategory::InsufficientLiquidity)
}

pub fn fee_opportunities(scores: &[OpportunityScore]) -> Vec<OpportunityScore> {
    by_category(scores, CausalCategory::FeeInsufficient)
}

pub fn capacity_opportunities(scores: &[OpportunityScore]) -> Vec<OpportunityScore> {
    by_category(scores, CausalCategory::CapacityConstraint)
}
