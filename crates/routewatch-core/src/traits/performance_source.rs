use crate::errors::RoutewatchResult;
use crate::models::{ChannelId, PerformanceSample, TimeRange};

/// Observed revenue and flow rates for a channel over a time range.
///
/// `Ok(None)` means no data for the range, which the safety monitor treats as
/// "no breach observed yet".
pub trait IPerformanceSource: Send + Sync {
    fn sample(
        &self,
        channel_id: ChannelId,
        range: TimeRange,
    ) -> RoutewatchResult<Option<PerformanceSample>>;
}
