mod balance_lookup;
mod event_sink;
mod fee_policy_lookup;
mod performance_source;
mod policy_sink;
mod stats_reader;

pub use balance_lookup::IBalanceLookup;
pub use event_sink::IEventSink;
pub use fee_policy_lookup::IFeePolicyLookup;
pub use performance_source::IPerformanceSource;
pub use policy_sink::IPolicySink;
pub use stats_reader::IChannelStatsReader;
