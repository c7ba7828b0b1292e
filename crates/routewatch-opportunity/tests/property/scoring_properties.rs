//! Property tests for scoring: urgency bounds, determinism, and ranking order.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use routewatch_core::config::ScoringConfig;
use routewatch_core::models::{
    ChannelFailureStats, ChannelId, FailureCause, FeePolicy, ForwardingEvent, TimeRange,
};
use routewatch_opportunity::ranking;
use routewatch_opportunity::scorer::{score_channel, ScoringThresholds};
use routewatch_opportunity::urgency::{urgency, urgency_score};

fn cause_strategy() -> impl Strategy<Value = FailureCause> {
    prop_oneof![
        Just(FailureCause::InsufficientBalance),
        Just(FailureCause::FeeInsufficient),
        Just(FailureCause::AmountAboveMaximum),
        Just(FailureCause::UnknownNextPeer),
        any::<u16>().prop_map(FailureCause::from_wire_code),
    ]
}

/// (minutes before window end, amount, failure cause or success)
fn event_strategy() -> impl Strategy<Value = (i64, u64, Option<FailureCause>)> {
    (
        1i64..(36 * 60),
        1u64..5_000_000_000,
        prop::option::of(cause_strategy()),
    )
}

fn build_stats(id: u64, events: &[(i64, u64, Option<FailureCause>)]) -> ChannelFailureStats {
    let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let channel = ChannelId(id);
    let mut stats = ChannelFailureStats::new(channel, 100, end - Duration::days(2));
    for (mins, amount, cause) in events {
        let ts = end - Duration::minutes(*mins);
        let event = match cause {
            Some(c) => ForwardingEvent::failure(ts, None, Some(channel), *amount, 0, *c),
            None => ForwardingEvent::success(ts, None, Some(channel), *amount, 0),
        };
        stats.record(event, 0);
    }
    stats
}

fn window() -> TimeRange {
    let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    TimeRange::ending_at(end, Duration::hours(24)).unwrap()
}

fn lenient() -> ScoringThresholds {
    ScoringThresholds {
        min_failure_count: 1,
        min_missed_fee_msat: 0,
    }
}

// =============================================================================
// Urgency bounds: 0 ≤ urgency ≤ 100 for any inputs
// =============================================================================
proptest! {
    #[test]
    fn urgency_is_bounded(
        missed in any::<u64>(),
        count in any::<u64>(),
        rate in prop_oneof![-10.0f64..10.0, Just(f64::NAN), Just(f64::INFINITY)],
    ) {
        let score = urgency_score(&urgency(missed, count, rate));
        prop_assert!((0.0..=100.0).contains(&score), "score {} out of bounds", score);
    }
}

// =============================================================================
// Determinism: identical stats and window give identical scores
// =============================================================================
proptest! {
    #[test]
    fn scoring_is_deterministic(
        events in prop::collection::vec(event_strategy(), 0..80),
        ppm in 0u32..10_000,
        ratio in 0.0f64..=1.0,
    ) {
        let stats = build_stats(1, &events);
        let policy = FeePolicy::new(0, ppm);
        let config = ScoringConfig::default();
        let a = score_channel(&stats, window(), lenient(), Some(&policy), |_| Some(ratio), &config);
        let b = score_channel(&stats, window(), lenient(), Some(&policy), |_| Some(ratio), &config);
        prop_assert_eq!(a.clone(), b);
        if let Some(score) = a {
            prop_assert!((0.0..=100.0).contains(&score.urgency_score));
            prop_assert!(score.failure_count >= 1);
            prop_assert!((0.0..=1.0).contains(&score.failure_rate));
        }
    }
}

// =============================================================================
// Ranking: a total order consistent with the tie-break rules
// =============================================================================
proptest! {
    #[test]
    fn ranking_respects_tie_breaks(
        channels in prop::collection::vec(prop::collection::vec(event_strategy(), 1..30), 1..12),
    ) {
        let policy = FeePolicy::new(0, 1_000);
        let config = ScoringConfig::default();
        let mut scores: Vec<_> = channels
            .iter()
            .enumerate()
            .filter_map(|(i, events)| {
                let stats = build_stats(i as u64, events);
                score_channel(&stats, window(), lenient(), Some(&policy), |_| Some(0.7), &config)
            })
            .collect();
        let mut reversed = scores.clone();
        reversed.reverse();

        ranking::rank(&mut scores);
        ranking::rank(&mut reversed);
        prop_assert_eq!(&scores, &reversed);

        for pair in scores.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.urgency_score >= b.urgency_score);
            if a.urgency_score == b.urgency_score {
                prop_assert!(a.missed_fee_estimate_msat >= b.missed_fee_estimate_msat);
                if a.missed_fee_estimate_msat == b.missed_fee_estimate_msat {
                    prop_assert!(a.channel_id < b.channel_id);
                }
            }
        }
    }
}
