use crate::errors::RoutewatchResult;
use crate::models::ChannelId;

/// Local balance ratio (local / capacity, in [0, 1]) of a channel.
pub trait IBalanceLookup: Send + Sync {
    fn local_balance_ratio(&self, channel_id: ChannelId) -> RoutewatchResult<Option<f64>>;
}
