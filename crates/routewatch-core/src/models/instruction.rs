use serde::{Deserialize, Serialize};

use super::{ChangeId, ChannelId, FeePolicy, RecommendedAction, RollbackReason};

/// What the core hands to the policy-application sink. The core never
/// applies anything itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyInstruction {
    /// A scored recommendation. `suggested_policy` is set for fee actions.
    Recommend {
        channel_id: ChannelId,
        action: RecommendedAction,
        urgency_score: f64,
        suggested_policy: Option<FeePolicy>,
    },
    /// Restore the policy in effect before `change_id`.
    Rollback {
        channel_id: ChannelId,
        change_id: ChangeId,
        restore: FeePolicy,
        reason: RollbackReason,
    },
}

impl PolicyInstruction {
    pub fn channel_id(&self) -> ChannelId {
        match self {
            PolicyInstruction::Recommend { channel_id, .. }
            | PolicyInstruction::Rollback { channel_id, .. } => *channel_id,
        }
    }
}
