//! Failure classifier: a total, pure function from raw cause to category.

use std::collections::BTreeMap;

use routewatch_core::models::{CausalCategory, FailureCause};

/// Map a structured failure cause to its causal category.
///
/// Total over the cause set; unrecognised wire codes land in `Unknown`.
pub fn classify(cause: FailureCause) -> CausalCategory {
    match cause {
        FailureCause::InsufficientBalance | FailureCause::TemporaryChannelFailure => {
            CausalCategory::InsufficientLiquidity
        }
        FailureCause::FeeInsufficient => CausalCategory::FeeInsufficient,
        FailureCause::AmountBelowMinimum
        | FailureCause::AmountAboveMaximum
        | FailureCause::MaxHtlcsExceeded => CausalCategory::CapacityConstraint,
        FailureCause::UnknownNextPeer | FailureCause::ChannelDisabled => {
            CausalCategory::PeerUnavailable
        }
        FailureCause::IncorrectCltvExpiry
        | FailureCause::ExpiryTooSoon
        | FailureCause::Other(_) => CausalCategory::Unknown,
    }
}

/// Fold `(cause, count)` pairs into per-category totals.
pub fn category_totals(
    causes: impl IntoIterator<Item = (FailureCause, u64)>,
) -> BTreeMap<CausalCategory, u64> {
    let mut totals = BTreeMap::new();
    for (cause, count) in causes {
        *totals.entry(classify(cause)).or_insert(0) += count;
    }
    totals
}

/// The category with the highest count. Ties go to the category declared
/// first in [`CausalCategory`]. `None` when there are no failures.
pub fn plurality(totals: &BTreeMap<CausalCategory, u64>) -> Option<CausalCategory> {
    let mut best: Option<(CausalCategory, u64)> = None;
    // BTreeMap iterates in declaration order, so strict `>` keeps the earliest on ties.
    for (category, count) in totals {
        if *count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((*category, *count)),
        }
    }
    best.map(|(category, _)| category)
}
