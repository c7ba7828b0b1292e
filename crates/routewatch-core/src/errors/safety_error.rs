/// Errors raised when submitting a policy change to the safety monitor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SafetyError {
    #[error("invalid {metric} baseline {value}: must be finite and non-negative")]
    InvalidBaseline { metric: &'static str, value: f64 },

    #[error("invalid {metric} rollback threshold {value}: must be in (0, 1]")]
    InvalidThreshold { metric: &'static str, value: f64 },
}
