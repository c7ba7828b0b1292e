use serde::{Deserialize, Serialize};

/// Causal category a failure is classified into.
///
/// Declaration order is the plurality tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalCategory {
    InsufficientLiquidity,
    FeeInsufficient,
    CapacityConstraint,
    PeerUnavailable,
    Unknown,
}

impl CausalCategory {
    /// All categories in tie-break order.
    pub const ALL: [CausalCategory; 5] = [
        CausalCategory::InsufficientLiquidity,
        CausalCategory::FeeInsufficient,
        CausalCategory::CapacityConstraint,
        CausalCategory::PeerUnavailable,
        CausalCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CausalCategory::InsufficientLiquidity => "insufficient_liquidity",
            CausalCategory::FeeInsufficient => "fee_insufficient",
            CausalCategory::CapacityConstraint => "capacity_constraint",
            CausalCategory::PeerUnavailable => "peer_unavailable",
            CausalCategory::Unknown => "unknown",
        }
    }
}
