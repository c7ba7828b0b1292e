//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

use routewatch_core::models::{ChangeId, ChannelId, FailureCause, RecommendedAction, RollbackReason};

use crate::metrics::PipelineMetricsSnapshot;

/// A raw record was rejected at the ingestion boundary.
pub fn event_rejected(kind: &str, reason: &str) {
    tracing::warn!(
        event = "event_rejected",
        kind = %kind,
        reason = %reason,
        "forwarding record rejected"
    );
}

/// A forward failed for lack of liquidity on the attributed channel.
pub fn liquidity_failure(channel_id: ChannelId, amount_msat: u64, cause: FailureCause) {
    tracing::info!(
        event = "liquidity_failure",
        channel_id = %channel_id,
        amount_msat = amount_msat,
        cause = ?cause,
        "liquidity failure"
    );
}

/// Channels were dropped from the statistics store.
pub fn channels_evicted(count: usize, reason: &str, remaining: usize) {
    tracing::info!(
        event = "channels_evicted",
        count = count,
        reason = %reason,
        remaining = remaining,
        "channels evicted"
    );
}

pub fn opportunity_detected(
    channel_id: ChannelId,
    action: RecommendedAction,
    urgency_score: f64,
    missed_fee_msat: u64,
) {
    tracing::info!(
        event = "opportunity_detected",
        channel_id = %channel_id,
        action = action.as_str(),
        urgency_score = urgency_score,
        missed_fee_msat = missed_fee_msat,
        "opportunity detected"
    );
}

pub fn rollback_triggered(channel_id: ChannelId, change_id: ChangeId, reason: &RollbackReason) {
    tracing::warn!(
        event = "rollback_triggered",
        channel_id = %channel_id,
        change_id = %change_id,
        reason = ?reason,
        "policy change rolled back"
    );
}

/// The rollback instruction could not be delivered. The record stays rolled back.
pub fn rollback_emit_failed(channel_id: ChannelId, change_id: ChangeId, error: &str) {
    tracing::error!(
        event = "rollback_emit_failed",
        channel_id = %channel_id,
        change_id = %change_id,
        error = %error,
        "failed to deliver rollback instruction"
    );
}

pub fn change_confirmed(channel_id: ChannelId, change_id: ChangeId) {
    tracing::info!(
        event = "change_confirmed",
        channel_id = %channel_id,
        change_id = %change_id,
        "policy change confirmed"
    );
}

pub fn change_superseded(channel_id: ChannelId, change_id: ChangeId, superseded_by: ChangeId) {
    tracing::info!(
        event = "change_superseded",
        channel_id = %channel_id,
        change_id = %change_id,
        superseded_by = %superseded_by,
        "policy change superseded"
    );
}

/// A subscriber queue was full and an event was dropped for it.
pub fn subscriber_lagging(subscriber: &str, dropped_total: u64) {
    tracing::warn!(
        event = "subscriber_lagging",
        subscriber = %subscriber,
        dropped_total = dropped_total,
        "subscriber lagging, event dropped"
    );
}

pub fn source_reconnecting(attempt: u32, delay_ms: u64, error: &str) {
    tracing::warn!(
        event = "source_reconnecting",
        attempt = attempt,
        delay_ms = delay_ms,
        error = %error,
        "event source disconnected, reconnecting"
    );
}

/// Periodic dump of the pipeline counters.
pub fn metrics_reported(snapshot: &PipelineMetricsSnapshot) {
    tracing::info!(
        event = "metrics_reported",
        events_accepted = snapshot.events_accepted,
        events_rejected = snapshot.total_rejected(),
        subscriber_drops = snapshot.total_subscriber_drops(),
        channels_evicted = snapshot.channels_evicted,
        rollbacks_emitted = snapshot.rollbacks_emitted,
        "pipeline metrics"
    );
}
