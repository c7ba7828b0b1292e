//! Opportunity scorer: one channel, one analysis window.

use std::collections::BTreeMap;
use std::sync::Arc;

use routewatch_core::config::ScoringConfig;
use routewatch_core::constants::DAYS_PER_MONTH;
use routewatch_core::models::{
    CausalCategory, ChannelFailureStats, ChannelId, FeePolicy, OpportunityScore, RecommendedAction,
    TimeRange,
};
use routewatch_core::traits::{IBalanceLookup, IFeePolicyLookup};

use crate::classifier::{classify, plurality};
use crate::recommendation::{recommend, suggested_fee_rate_ppm};
use crate::urgency::{urgency, urgency_score};

/// Noise-suppression thresholds. Channels below either are filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringThresholds {
    pub min_failure_count: u64,
    pub min_missed_fee_msat: u64,
}

impl From<&ScoringConfig> for ScoringThresholds {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            min_failure_count: config.min_failure_count,
            min_missed_fee_msat: config.min_missed_fee_msat,
        }
    }
}

/// Window-local totals over a channel's retained events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowTally {
    pub failures: u64,
    pub successes: u64,
    pub missed_fee_msat: u64,
    pub missed_volume_msat: u64,
    pub categories: BTreeMap<CausalCategory, u64>,
}

impl WindowTally {
    /// Tally events inside `window`. Missed fee per failure is
    /// `amount × fee_rate_ppm / 1_000_000` under `policy`, or the fee the
    /// HTLC offered when no policy is known.
    pub fn collect(stats: &ChannelFailureStats, window: TimeRange, policy: Option<&FeePolicy>) -> Self {
        let mut tally = WindowTally::default();
        for event in stats.events_in(window) {
            match event.failure_cause() {
                None => tally.successes += 1,
                Some(cause) => {
                    tally.failures += 1;
                    *tally.categories.entry(classify(cause)).or_insert(0) += 1;
                    let missed = policy
                        .map(|p| p.proportional_fee_msat(event.amount_msat))
                        .unwrap_or(event.fee_msat);
                    tally.missed_fee_msat = tally.missed_fee_msat.saturating_add(missed);
                    tally.missed_volume_msat =
                        tally.missed_volume_msat.saturating_add(event.amount_msat);
                }
            }
        }
        tally
    }

    pub fn failure_rate(&self) -> f64 {
        let total = self.failures + self.successes;
        if total == 0 {
            return 0.0;
        }
        self.failures as f64 / total as f64
    }
}

/// Linear extrapolation of `missed_fee_msat` over the window to a 30-day
/// month. This is a naive extrapolation, not a forecast.
pub fn monthly_extrapolation_msat(missed_fee_msat: u64, window: TimeRange) -> u64 {
    let window_ms = window.duration().num_milliseconds().max(1) as u128;
    let month_ms = (DAYS_PER_MONTH * 86_400_000.0) as u128;
    let projected = missed_fee_msat as u128 * month_ms / window_ms;
    projected.min(u64::MAX as u128) as u64
}

/// Pure scoring given already-resolved collaborator answers.
///
/// `balance_ratio` is consulted only when liquidity is the plurality cause.
pub fn score_channel(
    stats: &ChannelFailureStats,
    window: TimeRange,
    thresholds: ScoringThresholds,
    policy: Option<&FeePolicy>,
    balance_ratio: impl FnOnce(ChannelId) -> Option<f64>,
    config: &ScoringConfig,
) -> Option<OpportunityScore> {
    let tally = WindowTally::collect(stats, window, policy);
    if tally.failures < thresholds.min_failure_count
        || tally.missed_fee_msat < thresholds.min_missed_fee_msat
    {
        return None;
    }

    let channel_id = stats.channel_id();
    let failure_rate = tally.failure_rate();
    let breakdown = urgency(tally.missed_fee_msat, tally.failures, failure_rate);
    let dominant = plurality(&tally.categories);

    let ratio = match dominant {
        Some(CausalCategory::InsufficientLiquidity) => balance_ratio(channel_id),
        _ => None,
    };
    let action = recommend(dominant, ratio);

    let suggested_fee_rate_ppm = match (action, policy) {
        (RecommendedAction::LowerFees, Some(p)) => Some(suggested_fee_rate_ppm(
            p.fee_rate_ppm,
            config.fee_reduction_factor,
            config.min_suggested_fee_ppm,
        )),
        _ => None,
    };

    Some(OpportunityScore {
        channel_id,
        window,
        failure_count: tally.failures,
        success_count: tally.successes,
        missed_fee_estimate_msat: tally.missed_fee_msat,
        missed_volume_msat: tally.missed_volume_msat,
        failure_rate,
        urgency_score: urgency_score(&breakdown),
        urgency: breakdown,
        dominant_category: dominant,
        recommended_action: action,
        suggested_fee_rate_ppm,
        potential_monthly_revenue_msat: monthly_extrapolation_msat(tally.missed_fee_msat, window),
    })
}

/// Scorer bound to the fee-policy and balance collaborators.
///
/// Lookup failures degrade to "unknown" rather than failing the score: a
/// missing fee policy falls back to offered fees, a missing balance ratio
/// turns a liquidity recommendation into `Investigate`.
pub struct OpportunityScorer {
    config: ScoringConfig,
    fee_lookup: Option<Arc<dyn IFeePolicyLookup>>,
    balance_lookup: Option<Arc<dyn IBalanceLookup>>,
}

impl OpportunityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            fee_lookup: None,
            balance_lookup: None,
        }
    }

    pub fn with_fee_lookup(mut self, lookup: Arc<dyn IFeePolicyLookup>) -> Self {
        self.fee_lookup = Some(lookup);
        self
    }

    pub fn with_balance_lookup(mut self, lookup: Arc<dyn IBalanceLookup>) -> Self {
        self.balance_lookup = Some(lookup);
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn thresholds(&self) -> ScoringThresholds {
        ScoringThresholds::from(&self.config)
    }

    /// Score with the configured thresholds.
    pub fn score(&self, stats: &ChannelFailureStats, window: TimeRange) -> Option<OpportunityScore> {
        self.score_with(stats, window, self.thresholds())
    }

    pub fn score_with(
        &self,
        stats: &ChannelFailureStats,
        window: TimeRange,
        thresholds: ScoringThresholds,
    ) -> Option<OpportunityScore> {
        let policy = self.current_policy(stats.channel_id(), window);
        score_channel(
            stats,
            window,
            thresholds,
            policy.as_ref(),
            |id| self.balance_ratio(id),
            &self.config,
        )
    }

    /// Fee policy in effect at the end of `window`, if known.
    pub fn current_policy(&self, channel_id: ChannelId, window: TimeRange) -> Option<FeePolicy> {
        let lookup = self.fee_lookup.as_ref()?;
        match lookup.fee_policy(channel_id, window.end()) {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!(channel_id = %channel_id, error = %e, "fee policy lookup failed");
                None
            }
        }
    }

    fn balance_ratio(&self, channel_id: ChannelId) -> Option<f64> {
        let lookup = self.balance_lookup.as_ref()?;
        match lookup.local_balance_ratio(channel_id) {
            Ok(Some(r)) if (0.0..=1.0).contains(&r) => Some(r),
            Ok(Some(r)) => {
                tracing::warn!(channel_id = %channel_id, ratio = r, "balance ratio out of range");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(channel_id = %channel_id, error = %e, "balance lookup failed");
                None
            }
        }
    }
}
