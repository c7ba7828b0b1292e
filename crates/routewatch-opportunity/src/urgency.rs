//! Urgency score: three independently capped components summing to 0–100.
//!
//! The 40/30/30 weighting and its normalizers are a fixed calibration that
//! downstream consumers depend on. Keep them verbatim.

use routewatch_core::constants::{MAX_URGENCY_SCORE, MSAT_PER_SAT};
use routewatch_core::models::UrgencyBreakdown;

pub const REVENUE_CAP: f64 = 40.0;
pub const FREQUENCY_CAP: f64 = 30.0;
pub const RATE_WEIGHT: f64 = 30.0;

/// Missed fee (in sats) at which the revenue component saturates, per point.
const REVENUE_NORMALIZER_SAT: f64 = 1000.0;
const REVENUE_MULTIPLIER: f64 = 4.0;
const FREQUENCY_NORMALIZER: f64 = 10.0;

pub fn urgency(missed_fee_msat: u64, failure_count: u64, failure_rate: f64) -> UrgencyBreakdown {
    let missed_sat = missed_fee_msat as f64 / MSAT_PER_SAT as f64;
    let revenue = (missed_sat / REVENUE_NORMALIZER_SAT * REVENUE_MULTIPLIER).min(REVENUE_CAP);
    let frequency = (failure_count as f64 / FREQUENCY_NORMALIZER * FREQUENCY_CAP).min(FREQUENCY_CAP);
    let rate = if failure_rate.is_finite() {
        failure_rate.clamp(0.0, 1.0) * RATE_WEIGHT
    } else {
        0.0
    };
    UrgencyBreakdown {
        revenue,
        frequency,
        rate,
    }
}

/// Final score, clamped to `[0, 100]`.
pub fn urgency_score(breakdown: &UrgencyBreakdown) -> f64 {
    breakdown.total().clamp(0.0, MAX_URGENCY_SCORE)
}
