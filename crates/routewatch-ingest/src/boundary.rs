//! Ingestion boundary: raw records from the event source are validated here
//! and either become a [`ForwardingEvent`] or are rejected with an
//! [`IngestionError`]. Nothing past this point sees malformed input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use routewatch_core::errors::IngestionError;
use routewatch_core::models::{ChannelId, FailureCause, ForwardingEvent};

/// A forwarding record as the source adapter hands it over, before any
/// validation. Every field is optional so that missing data is reported as
/// a rejection rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawForwardingRecord {
    /// Resolution time. Records without one are stamped on arrival.
    pub timestamp: Option<DateTime<Utc>>,
    pub incoming_channel_id: Option<String>,
    pub outgoing_channel_id: Option<String>,
    pub amount_msat: Option<i64>,
    pub fee_msat: Option<i64>,
    /// `true` for a settled forward, `false` for a failed one.
    pub settled: Option<bool>,
    /// BOLT-4 onion failure code.
    pub failure_code: Option<u16>,
    /// Named local failure, for causes without an onion code
    /// (e.g. `"insufficient_balance"`, `"max_htlcs_exceeded"`).
    pub failure_cause: Option<String>,
}

impl RawForwardingRecord {
    /// Validate into a [`ForwardingEvent`]. `received_at` stamps records
    /// that carry no timestamp of their own.
    pub fn validate(self, received_at: DateTime<Utc>) -> Result<ForwardingEvent, IngestionError> {
        let incoming = parse_channel(self.incoming_channel_id.as_deref())?;
        let outgoing = parse_channel(self.outgoing_channel_id.as_deref())?;
        if incoming.is_none() && outgoing.is_none() {
            return Err(IngestionError::MissingField {
                field: "channel_id",
            });
        }

        let amount = self
            .amount_msat
            .ok_or(IngestionError::MissingField {
                field: "amount_msat",
            })?;
        let amount_msat = non_negative("amount_msat", amount)?;
        if amount_msat == 0 {
            return Err(IngestionError::InvalidAmount {
                field: "amount_msat",
                reason: "must be greater than 0".to_string(),
            });
        }
        let fee_msat = non_negative("fee_msat", self.fee_msat.unwrap_or(0))?;
        let timestamp = self.timestamp.unwrap_or(received_at);

        let settled = self
            .settled
            .ok_or(IngestionError::MissingField { field: "settled" })?;
        let has_failure_detail = self.failure_code.is_some() || self.failure_cause.is_some();

        if settled {
            if has_failure_detail {
                return Err(IngestionError::InconsistentOutcome {
                    reason: "settled record carries a failure cause".to_string(),
                });
            }
            return Ok(ForwardingEvent::success(
                timestamp,
                incoming,
                outgoing,
                amount_msat,
                fee_msat,
            ));
        }

        let cause = match (self.failure_cause.as_deref(), self.failure_code) {
            (Some(name), _) => named_cause(name).ok_or_else(|| {
                IngestionError::InconsistentOutcome {
                    reason: format!("unknown failure cause {name:?}"),
                }
            })?,
            (None, Some(code)) => FailureCause::from_wire_code(code),
            (None, None) => {
                return Err(IngestionError::MissingField {
                    field: "failure_code",
                })
            }
        };

        Ok(ForwardingEvent::failure(
            timestamp,
            incoming,
            outgoing,
            amount_msat,
            fee_msat,
            cause,
        ))
    }
}

fn parse_channel(raw: Option<&str>) -> Result<Option<ChannelId>, IngestionError> {
    raw.map(str::parse::<ChannelId>).transpose()
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, IngestionError> {
    u64::try_from(value).map_err(|_| IngestionError::InvalidAmount {
        field,
        reason: format!("negative value {value}"),
    })
}

/// Named causes the source may report instead of a wire code.
fn named_cause(name: &str) -> Option<FailureCause> {
    let cause = match name.trim().to_ascii_lowercase().as_str() {
        "insufficient_balance" => FailureCause::InsufficientBalance,
        "temporary_channel_failure" => FailureCause::TemporaryChannelFailure,
        "fee_insufficient" => FailureCause::FeeInsufficient,
        "amount_below_minimum" => FailureCause::AmountBelowMinimum,
        "amount_above_maximum" => FailureCause::AmountAboveMaximum,
        "max_htlcs_exceeded" => FailureCause::MaxHtlcsExceeded,
        "unknown_next_peer" => FailureCause::UnknownNextPeer,
        "channel_disabled" => FailureCause::ChannelDisabled,
        "incorrect_cltv_expiry" => FailureCause::IncorrectCltvExpiry,
        "expiry_too_soon" => FailureCause::ExpiryTooSoon,
        _ => return None,
    };
    Some(cause)
}
