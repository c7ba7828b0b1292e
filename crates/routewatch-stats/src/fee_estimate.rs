//! Missed-fee estimation for a failed forward.

use routewatch_core::models::ForwardingEvent;
use routewatch_core::traits::IFeePolicyLookup;

/// Fee the node would have earned had `event` succeeded.
///
/// Uses the channel's proportional rate in effect at the event's timestamp.
/// When no policy is known (or the lookup fails) the fee offered by the HTLC
/// itself is used instead. Successes contribute nothing.
pub fn missed_fee_msat(event: &ForwardingEvent, lookup: Option<&dyn IFeePolicyLookup>) -> u64 {
    if !event.is_failure() {
        return 0;
    }
    let Some(channel_id) = event.attributed_channel() else {
        return event.fee_msat;
    };
    match lookup.map(|l| l.fee_policy(channel_id, event.timestamp)) {
        Some(Ok(Some(policy))) => policy.proportional_fee_msat(event.amount_msat),
        Some(Err(e)) => {
            tracing::debug!(
                channel_id = %channel_id,
                error = %e,
                "fee policy lookup failed, using offered fee"
            );
            event.fee_msat
        }
        Some(Ok(None)) | None => event.fee_msat,
    }
}
