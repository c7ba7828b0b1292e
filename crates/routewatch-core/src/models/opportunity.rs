use serde::{Deserialize, Serialize};

use super::{CausalCategory, ChannelId, TimeRange};

/// Closed set of recommended actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    RebalanceInbound,
    RebalanceOutbound,
    LowerFees,
    IncreaseCapacity,
    Investigate,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::RebalanceInbound => "rebalance_inbound",
            RecommendedAction::RebalanceOutbound => "rebalance_outbound",
            RecommendedAction::LowerFees => "lower_fees",
            RecommendedAction::IncreaseCapacity => "increase_capacity",
            RecommendedAction::Investigate => "investigate",
        }
    }
}

/// The three capped components of the urgency score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UrgencyBreakdown {
    /// 0–40, from absolute missed revenue.
    pub revenue: f64,
    /// 0–30, from failure count.
    pub frequency: f64,
    /// 0–30, from failure rate.
    pub rate: f64,
}

impl UrgencyBreakdown {
    pub fn total(&self) -> f64 {
        self.revenue + self.frequency + self.rate
    }
}

/// Scored missed-revenue opportunity for one channel over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityScore {
    pub channel_id: ChannelId,
    pub window: TimeRange,
    pub failure_count: u64,
    pub success_count: u64,
    pub missed_fee_estimate_msat: u64,
    pub missed_volume_msat: u64,
    /// failures / (failures + successes) within the window.
    pub failure_rate: f64,
    /// 0–100.
    pub urgency_score: f64,
    pub urgency: UrgencyBreakdown,
    pub dominant_category: Option<CausalCategory>,
    pub recommended_action: RecommendedAction,
    /// Only set for `LowerFees`.
    pub suggested_fee_rate_ppm: Option<u32>,
    /// Linear extrapolation of the window's missed fee to 30 days. Not a forecast.
    pub potential_monthly_revenue_msat: u64,
}
