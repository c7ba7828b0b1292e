use chrono::{DateTime, Utc};

use crate::errors::RoutewatchResult;
use crate::models::{ChannelId, FeePolicy};

/// Fee policy in effect for a channel at a point in time.
pub trait IFeePolicyLookup: Send + Sync {
    fn fee_policy(&self, channel_id: ChannelId, at: DateTime<Utc>)
        -> RoutewatchResult<Option<FeePolicy>>;
}
