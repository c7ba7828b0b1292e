use crate::models::{ChannelFailureStats, ChannelId};

/// Read side of the statistics store. The analyzer depends only on this, so a
/// persisted or remote provider can stand in for the in-memory store.
pub trait IChannelStatsReader: Send + Sync {
    /// Consistent copy of one channel's aggregate.
    fn get(&self, channel_id: ChannelId) -> Option<ChannelFailureStats>;

    /// Consistent copies of every tracked aggregate (each one individually atomic).
    fn snapshot_all(&self) -> Vec<ChannelFailureStats>;
}
