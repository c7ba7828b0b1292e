use crate::errors::RoutewatchResult;
use crate::models::ClassifiedEvent;

/// A subscriber to classified events. Each sink is driven from its own queue
/// on a blocking thread, so a slow or failing sink never blocks ingestion or
/// other sinks. `accept` may block.
pub trait IEventSink: Send + Sync {
    /// Name used in logs and drop counters.
    fn name(&self) -> &str;

    fn accept(&self, event: &ClassifiedEvent) -> RoutewatchResult<()>;
}
