//! Recommendation mapping from dominant cause to action.

use routewatch_core::models::{CausalCategory, RecommendedAction};

/// Local balance ratio above which liquidity failures call for inbound rebalancing.
pub const INBOUND_BALANCE_RATIO: f64 = 0.5;

/// First matching rule wins:
/// liquidity with ratio > 0.5 → inbound, liquidity otherwise → outbound,
/// fee → lower fees, capacity → increase capacity, anything else → investigate.
///
/// A liquidity plurality with no known balance ratio cannot be directed
/// either way and maps to `Investigate`.
pub fn recommend(plurality: Option<CausalCategory>, balance_ratio: Option<f64>) -> RecommendedAction {
    match plurality {
        Some(CausalCategory::InsufficientLiquidity) => match balance_ratio {
            Some(r) if r > INBOUND_BALANCE_RATIO => RecommendedAction::RebalanceInbound,
            Some(r) if r.is_finite() => RecommendedAction::RebalanceOutbound,
            _ => RecommendedAction::Investigate,
        },
        Some(CausalCategory::FeeInsufficient) => RecommendedAction::LowerFees,
        Some(CausalCategory::CapacityConstraint) => RecommendedAction::IncreaseCapacity,
        Some(CausalCategory::PeerUnavailable) | Some(CausalCategory::Unknown) | None => {
            RecommendedAction::Investigate
        }
    }
}

/// `max(floor_ppm, floor(current_ppm × factor))`.
pub fn suggested_fee_rate_ppm(current_ppm: u32, factor: f64, floor_ppm: u32) -> u32 {
    let reduced = (current_ppm as f64 * factor).floor();
    let reduced = if reduced.is_finite() && reduced > 0.0 {
        reduced.min(u32::MAX as f64) as u32
    } else {
        0
    };
    reduced.max(floor_ppm)
}
