mod collaborator_error;
mod config_error;
mod ingestion_error;
mod safety_error;

pub use collaborator_error::CollaboratorError;
pub use config_error::ConfigError;
pub use ingestion_error::IngestionError;
pub use safety_error::SafetyError;

use chrono::{DateTime, Utc};

/// Convenience alias used across the workspace.
pub type RoutewatchResult<T> = Result<T, RoutewatchError>;

/// Top-level error type. Subsystem errors convert into it via `?`.
#[derive(Debug, thiserror::Error)]
pub enum RoutewatchError {
    #[error("ingestion rejected: {0}")]
    IngestionError(#[from] IngestionError),

    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("safety monitor error: {0}")]
    SafetyError(#[from] SafetyError),

    #[error("collaborator error: {0}")]
    CollaboratorError(#[from] CollaboratorError),

    #[error("invalid time range: start {start} is not before end {end}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RoutewatchError {
    /// Configuration-level errors are fatal at startup; everything else is
    /// handled locally by the pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RoutewatchError::ConfigError(_))
    }
}
