use std::future::Future;

use routewatch_core::errors::RoutewatchResult;

use crate::boundary::RawForwardingRecord;

/// The external stream of forwarding records.
///
/// `Ok(None)` from [`next_record`](Self::next_record) means the stream ended;
/// the ingestion loop then reconnects with backoff, exactly as it does on
/// `Err`.
pub trait IEventSource: Send {
    fn next_record(
        &mut self,
    ) -> impl Future<Output = RoutewatchResult<Option<RawForwardingRecord>>> + Send;

    /// Re-establish the subscription after an error or end of stream.
    fn reconnect(&mut self) -> impl Future<Output = RoutewatchResult<()>> + Send;
}
