/// Reasons a raw forwarding record is rejected at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestionError {
    #[error("invalid channel id {value:?}: {reason}")]
    InvalidChannelId { value: String, reason: String },

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid amount in {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    #[error("inconsistent outcome: {reason}")]
    InconsistentOutcome { reason: String },
}

impl IngestionError {
    /// Stable label used for per-kind rejection counters.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestionError::InvalidChannelId { .. } => "invalid_channel_id",
            IngestionError::MissingField { .. } => "missing_field",
            IngestionError::InvalidAmount { .. } => "invalid_amount",
            IngestionError::InconsistentOutcome { .. } => "inconsistent_outcome",
        }
    }
}
