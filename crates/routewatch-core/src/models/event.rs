use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CausalCategory, ChannelId};

const UPDATE: u16 = 0x1000;
const PERM: u16 = 0x4000;

const TEMPORARY_CHANNEL_FAILURE: u16 = UPDATE | 7;
const AMOUNT_BELOW_MINIMUM: u16 = UPDATE | 11;
const FEE_INSUFFICIENT: u16 = UPDATE | 12;
const INCORRECT_CLTV_EXPIRY: u16 = UPDATE | 13;
const EXPIRY_TOO_SOON: u16 = UPDATE | 14;
const CHANNEL_DISABLED: u16 = UPDATE | 20;
const UNKNOWN_NEXT_PEER: u16 = PERM | 10;

/// Structured failure cause reported by the event source.
///
/// This is a closed set. Wire codes the adapter does not recognise are kept
/// as `Other(code)` rather than guessed from any accompanying text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// Local link had too little outbound balance for the HTLC.
    InsufficientBalance,
    TemporaryChannelFailure,
    FeeInsufficient,
    AmountBelowMinimum,
    /// HTLC exceeded the channel's `htlc_maximum_msat`.
    AmountAboveMaximum,
    /// Channel already carries its maximum number of in-flight HTLCs.
    MaxHtlcsExceeded,
    UnknownNextPeer,
    ChannelDisabled,
    IncorrectCltvExpiry,
    ExpiryTooSoon,
    /// A wire failure code outside the known set.
    Other(u16),
}

impl FailureCause {
    /// Map a BOLT-4 onion failure code.
    pub fn from_wire_code(code: u16) -> Self {
        match code {
            TEMPORARY_CHANNEL_FAILURE => FailureCause::TemporaryChannelFailure,
            AMOUNT_BELOW_MINIMUM => FailureCause::AmountBelowMinimum,
            FEE_INSUFFICIENT => FailureCause::FeeInsufficient,
            INCORRECT_CLTV_EXPIRY => FailureCause::IncorrectCltvExpiry,
            EXPIRY_TOO_SOON => FailureCause::ExpiryTooSoon,
            CHANNEL_DISABLED => FailureCause::ChannelDisabled,
            UNKNOWN_NEXT_PEER => FailureCause::UnknownNextPeer,
            other => FailureCause::Other(other),
        }
    }

    /// The BOLT-4 code for this cause, if it has one. Local link failures
    /// (insufficient balance, HTLC limits) have no onion code.
    pub fn wire_code(&self) -> Option<u16> {
        match self {
            FailureCause::TemporaryChannelFailure => Some(TEMPORARY_CHANNEL_FAILURE),
            FailureCause::AmountBelowMinimum => Some(AMOUNT_BELOW_MINIMUM),
            FailureCause::FeeInsufficient => Some(FEE_INSUFFICIENT),
            FailureCause::IncorrectCltvExpiry => Some(INCORRECT_CLTV_EXPIRY),
            FailureCause::ExpiryTooSoon => Some(EXPIRY_TOO_SOON),
            FailureCause::ChannelDisabled => Some(CHANNEL_DISABLED),
            FailureCause::UnknownNextPeer => Some(UNKNOWN_NEXT_PEER),
            FailureCause::Other(code) => Some(*code),
            FailureCause::InsufficientBalance
            | FailureCause::AmountAboveMaximum
            | FailureCause::MaxHtlcsExceeded => None,
        }
    }
}

/// Outcome of a forwarding attempt. A failure always carries its cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardOutcome {
    Success,
    Failure(FailureCause),
}

/// One resolved attempt to forward value across a channel pair.
///
/// Created by the event-source adapter when the attempt resolves and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingEvent {
    pub timestamp: DateTime<Utc>,
    pub incoming_channel_id: Option<ChannelId>,
    pub outgoing_channel_id: Option<ChannelId>,
    /// Outgoing amount in millisatoshis.
    pub amount_msat: u64,
    /// Fee earned on success; on failure, the fee the HTLC offered.
    pub fee_msat: u64,
    pub outcome: ForwardOutcome,
}

impl ForwardingEvent {
    pub fn success(
        timestamp: DateTime<Utc>,
        incoming_channel_id: Option<ChannelId>,
        outgoing_channel_id: Option<ChannelId>,
        amount_msat: u64,
        fee_msat: u64,
    ) -> Self {
        Self {
            timestamp,
            incoming_channel_id,
            outgoing_channel_id,
            amount_msat,
            fee_msat,
            outcome: ForwardOutcome::Success,
        }
    }

    pub fn failure(
        timestamp: DateTime<Utc>,
        incoming_channel_id: Option<ChannelId>,
        outgoing_channel_id: Option<ChannelId>,
        amount_msat: u64,
        offered_fee_msat: u64,
        cause: FailureCause,
    ) -> Self {
        Self {
            timestamp,
            incoming_channel_id,
            outgoing_channel_id,
            amount_msat,
            fee_msat: offered_fee_msat,
            outcome: ForwardOutcome::Failure(cause),
        }
    }

    /// The channel whose statistics this event updates: the outgoing channel
    /// when known, otherwise the incoming one.
    pub fn attributed_channel(&self) -> Option<ChannelId> {
        self.outgoing_channel_id.or(self.incoming_channel_id)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ForwardOutcome::Failure(_))
    }

    pub fn failure_cause(&self) -> Option<FailureCause> {
        match self.outcome {
            ForwardOutcome::Failure(cause) => Some(cause),
            ForwardOutcome::Success => None,
        }
    }
}

/// An accepted event together with the channel it was attributed to and its
/// causal category (`None` for successes). This is what subscribers receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    pub channel_id: ChannelId,
    pub category: Option<CausalCategory>,
    pub event: ForwardingEvent,
}
