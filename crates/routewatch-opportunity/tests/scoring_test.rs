mod common;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use routewatch_core::config::ScoringConfig;
use routewatch_core::models::{
    CausalCategory, ChannelFailureStats, ChannelId, FailureCause, FeePolicy, ForwardingEvent,
    RecommendedAction, TimeRange,
};
use routewatch_opportunity::scorer::{monthly_extrapolation_msat, score_channel, WindowTally};
use routewatch_opportunity::{OpportunityScorer, ScoringThresholds};

use common::{Balances, FailingBalances, FixedFee};

const CH: ChannelId = ChannelId(1);

fn stats_with(failures: &[(FailureCause, u64)], successes: usize) -> ChannelFailureStats {
    let now = Utc::now();
    let mut stats = ChannelFailureStats::new(CH, 100, now - Duration::hours(6));
    let mut minute = 10;
    for (cause, amount) in failures {
        stats.record(
            ForwardingEvent::failure(now - Duration::minutes(minute), None, Some(CH), *amount, 0, *cause),
            0,
        );
        minute += 1;
    }
    for _ in 0..successes {
        stats.record(
            ForwardingEvent::success(now - Duration::minutes(minute), None, Some(CH), 1_000, 1),
            0,
        );
        minute += 1;
    }
    stats
}

fn window() -> TimeRange {
    TimeRange::ending_at(Utc::now() + Duration::minutes(1), Duration::hours(24)).unwrap()
}

fn scorer(ppm: u32, ratio: Option<f64>) -> OpportunityScorer {
    let mut balances = HashMap::new();
    if let Some(r) = ratio {
        balances.insert(CH, r);
    }
    OpportunityScorer::new(ScoringConfig::default())
        .with_fee_lookup(Arc::new(FixedFee(ppm)))
        .with_balance_lookup(Arc::new(Balances(balances)))
}

// ── Worked example ────────────────────────────────────────────────────────

#[test]
fn worked_example_scores_52_94_rebalance_inbound() {
    let mut failures = vec![(FailureCause::InsufficientBalance, 82_000_000); 12];
    failures.extend([(FailureCause::FeeInsufficient, 82_000_000); 2]);
    failures.push((FailureCause::FeeInsufficient, 87_000_000));
    let stats = stats_with(&failures, 10);

    let score = scorer(1_000, Some(0.9)).score(&stats, window()).unwrap();

    assert_eq!(score.failure_count, 15);
    assert_eq!(score.missed_fee_estimate_msat, 1_235_000);
    assert!((score.failure_rate - 0.6).abs() < 1e-12);
    assert!((score.urgency.revenue - 4.94).abs() < 1e-9);
    assert!((score.urgency.frequency - 30.0).abs() < 1e-9);
    assert!((score.urgency.rate - 18.0).abs() < 1e-9);
    assert!((score.urgency_score - 52.94).abs() < 1e-9);
    assert_eq!(score.dominant_category, Some(CausalCategory::InsufficientLiquidity));
    assert_eq!(score.recommended_action, RecommendedAction::RebalanceInbound);
    assert_eq!(score.suggested_fee_rate_ppm, None);
}

#[test]
fn worked_example_golden_fixture() {
    let scenario = common::load_scenario("worked_example");
    let (_, analyzer) = common::analyzer_for(&scenario);
    let ranked = analyzer.analyze(scenario.now).unwrap();

    assert_eq!(ranked.len(), scenario.expected.len(), "{}", scenario.name);
    for (got, want) in ranked.iter().zip(&scenario.expected) {
        assert_eq!(got.channel_id, want.channel_id);
        assert_eq!(got.recommended_action, want.recommended_action);
        assert_eq!(got.failure_count, want.failure_count);
        assert_eq!(got.success_count, want.success_count);
        assert_eq!(got.missed_fee_estimate_msat, want.missed_fee_estimate_msat);
        assert!((got.urgency_score - want.urgency_score).abs() < 1e-9);
    }
}

// ── Threshold filtering ───────────────────────────────────────────────────

#[test]
fn one_below_min_failure_count_is_absent() {
    let stats = stats_with(&[(FailureCause::FeeInsufficient, 1_000_000_000); 2], 0);
    assert!(scorer(1_000, None).score(&stats, window()).is_none());
}

#[test]
fn exactly_min_failure_count_is_scored() {
    let stats = stats_with(&[(FailureCause::FeeInsufficient, 1_000_000_000); 3], 0);
    let score = scorer(1_000, None).score(&stats, window()).unwrap();
    assert_eq!(score.failure_count, 3);
    assert_eq!(score.recommended_action, RecommendedAction::LowerFees);
}

#[test]
fn below_min_missed_fee_is_absent() {
    // 3 × 10_000 msat = 30 sat < 100 sat
    let stats = stats_with(&[(FailureCause::FeeInsufficient, 10_000_000); 3], 0);
    assert!(scorer(1_000, None).score(&stats, window()).is_none());
}

#[test]
fn custom_thresholds_override_config() {
    let stats = stats_with(&[(FailureCause::FeeInsufficient, 10_000_000); 1], 0);
    let thresholds = ScoringThresholds {
        min_failure_count: 1,
        min_missed_fee_msat: 0,
    };
    assert!(scorer(1_000, None)
        .score_with(&stats, window(), thresholds)
        .is_some());
}

#[test]
fn events_outside_window_are_ignored() {
    let now = Utc::now();
    let mut stats = ChannelFailureStats::new(CH, 100, now - Duration::days(3));
    for h in [30, 40, 50] {
        stats.record(
            ForwardingEvent::failure(
                now - Duration::hours(h),
                None,
                Some(CH),
                1_000_000_000,
                0,
                FailureCause::FeeInsufficient,
            ),
            0,
        );
    }
    let window = TimeRange::ending_at(now, Duration::hours(24)).unwrap();
    assert!(scorer(1_000, None).score(&stats, window).is_none());
}

// ── Determinism ───────────────────────────────────────────────────────────

#[test]
fn repeated_scoring_is_identical() {
    let stats = stats_with(
        &[
            (FailureCause::InsufficientBalance, 500_000_000),
            (FailureCause::AmountBelowMinimum, 500_000_000),
            (FailureCause::AmountAboveMaximum, 500_000_000),
        ],
        4,
    );
    let s = scorer(2_000, Some(0.3));
    let w = window();
    let first = s.score(&stats, w);
    for _ in 0..10 {
        assert_eq!(s.score(&stats, w), first);
    }
    assert_eq!(
        first.unwrap().recommended_action,
        RecommendedAction::IncreaseCapacity
    );
}

// ── Missed fee and extrapolation ──────────────────────────────────────────

#[test]
fn missed_fee_falls_back_to_offered_fee_without_policy() {
    let now = Utc::now();
    let mut stats = ChannelFailureStats::new(CH, 100, now);
    for _ in 0..3 {
        stats.record(
            ForwardingEvent::failure(now, None, Some(CH), 1, 40_000, FailureCause::FeeInsufficient),
            0,
        );
    }
    let w = TimeRange::ending_at(now + Duration::seconds(1), Duration::hours(1)).unwrap();
    let tally = WindowTally::collect(&stats, w, None);
    assert_eq!(tally.missed_fee_msat, 120_000);

    let with_policy = WindowTally::collect(&stats, w, Some(&FeePolicy::new(0, 1_000_000)));
    assert_eq!(with_policy.missed_fee_msat, 3);
}

#[test]
fn monthly_extrapolation_is_linear_in_window_length() {
    let now = Utc::now();
    let day = TimeRange::ending_at(now, Duration::days(1)).unwrap();
    let week = TimeRange::ending_at(now, Duration::days(7)).unwrap();
    assert_eq!(monthly_extrapolation_msat(1_000, day), 30_000);
    assert_eq!(monthly_extrapolation_msat(7_000, week), 30_000);
}

// ── Recommendation inputs ─────────────────────────────────────────────────

#[test]
fn balance_lookup_failure_yields_investigate() {
    let stats = stats_with(&[(FailureCause::InsufficientBalance, 1_000_000_000); 5], 0);
    let s = OpportunityScorer::new(ScoringConfig::default())
        .with_fee_lookup(Arc::new(FixedFee(1_000)))
        .with_balance_lookup(Arc::new(FailingBalances));
    let score = s.score(&stats, window()).unwrap();
    assert_eq!(score.recommended_action, RecommendedAction::Investigate);
}

#[test]
fn balance_lookup_not_consulted_for_fee_plurality() {
    let stats = stats_with(&[(FailureCause::FeeInsufficient, 1_000_000_000); 5], 0);
    let score = score_channel(
        &stats,
        window(),
        ScoringThresholds::from(&ScoringConfig::default()),
        Some(&FeePolicy::new(0, 500)),
        |_| panic!("balance ratio must not be requested"),
        &ScoringConfig::default(),
    )
    .unwrap();
    assert_eq!(score.recommended_action, RecommendedAction::LowerFees);
    assert_eq!(score.suggested_fee_rate_ppm, Some(350));
}

#[test]
fn plurality_tie_prefers_liquidity_over_fee() {
    let stats = stats_with(
        &[
            (FailureCause::FeeInsufficient, 1_000_000_000),
            (FailureCause::FeeInsufficient, 1_000_000_000),
            (FailureCause::TemporaryChannelFailure, 1_000_000_000),
            (FailureCause::InsufficientBalance, 1_000_000_000),
        ],
        0,
    );
    let score = scorer(1_000, Some(0.1)).score(&stats, window()).unwrap();
    assert_eq!(score.recommended_action, RecommendedAction::RebalanceOutbound);
}

#[test]
fn unknown_plurality_investigates() {
    let stats = stats_with(&[(FailureCause::Other(0x2002), 1_000_000_000); 4], 0);
    let score = scorer(1_000, None).score(&stats, window()).unwrap();
    assert_eq!(score.dominant_category, Some(CausalCategory::Unknown));
    assert_eq!(score.recommended_action, RecommendedAction::Investigate);
}
