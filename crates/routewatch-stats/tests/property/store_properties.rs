//! Property tests for the statistics store: bounded memory and the
//! breakdown/total invariant.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use routewatch_core::config::StatsConfig;
use routewatch_core::models::{ChannelId, FailureCause, ForwardingEvent};
use routewatch_stats::BoundedStatsStore;

fn cause_strategy() -> impl Strategy<Value = FailureCause> {
    prop_oneof![
        Just(FailureCause::InsufficientBalance),
        Just(FailureCause::TemporaryChannelFailure),
        Just(FailureCause::FeeInsufficient),
        Just(FailureCause::AmountBelowMinimum),
        Just(FailureCause::UnknownNextPeer),
        Just(FailureCause::ChannelDisabled),
        any::<u16>().prop_map(FailureCause::from_wire_code),
    ]
}

/// (channel, seconds offset, failure cause or success)
fn event_strategy() -> impl Strategy<Value = (u64, i64, Option<FailureCause>)> {
    (0u64..40, 0i64..(72 * 3600), prop::option::of(cause_strategy()))
}

fn build(ch: u64, offset: i64, cause: Option<FailureCause>) -> ForwardingEvent {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let ts = base + Duration::seconds(offset);
    match cause {
        Some(c) => ForwardingEvent::failure(ts, None, Some(ChannelId(ch)), 10_000, 1, c),
        None => ForwardingEvent::success(ts, None, Some(ChannelId(ch)), 10_000, 1),
    }
}

// =============================================================================
// Bounded memory: buffers capped at N, eviction leaves only active channels
// =============================================================================
proptest! {
    #[test]
    fn bounded_memory_after_eviction(
        events in prop::collection::vec(event_strategy(), 0..400),
        capacity in 1usize..16,
        horizon_hours in 1i64..48,
    ) {
        let store = BoundedStatsStore::new(StatsConfig {
            event_buffer_capacity: capacity,
            ..StatsConfig::default()
        });
        for (ch, offset, cause) in &events {
            store.record(build(*ch, *offset, *cause));
        }

        let now = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();
        let horizon = Duration::hours(horizon_hours);
        store.evict_idle(now, horizon);

        for stats in store.snapshot_all() {
            prop_assert!(stats.recent_events().len() <= capacity);
            prop_assert!(stats.last_activity() >= now - horizon);
        }

        let active: std::collections::BTreeSet<u64> = events
            .iter()
            .filter(|(_, offset, _)| {
                build(0, *offset, None).timestamp >= now - horizon
            })
            .map(|(ch, _, _)| *ch)
            .collect();
        prop_assert_eq!(store.len(), active.len());
    }
}

// =============================================================================
// Breakdown invariant: total_failures == sum(failure_breakdown)
// =============================================================================
proptest! {
    #[test]
    fn breakdown_sums_to_total_failures(
        events in prop::collection::vec(event_strategy(), 0..300),
    ) {
        let store = BoundedStatsStore::new(StatsConfig::default());
        for (ch, offset, cause) in &events {
            store.record(build(*ch, *offset, *cause));
        }
        let mut failures = 0u64;
        for stats in store.snapshot_all() {
            let sum: u64 = stats.failure_breakdown().values().sum();
            prop_assert_eq!(sum, stats.total_failures());
            failures += stats.total_failures();
        }
        let expected = events.iter().filter(|(_, _, c)| c.is_some()).count() as u64;
        prop_assert_eq!(failures, expected);
    }
}

// =============================================================================
// Ceiling: the store never tracks more than max_channels
// =============================================================================
proptest! {
    #[test]
    fn ceiling_is_never_exceeded(
        events in prop::collection::vec(event_strategy(), 0..200),
        max_channels in 1usize..10,
    ) {
        let store = BoundedStatsStore::new(StatsConfig {
            max_channels,
            ..StatsConfig::default()
        });
        for (ch, offset, cause) in &events {
            store.record(build(*ch, *offset, *cause));
            prop_assert!(store.len() <= max_channels);
        }
    }
}
