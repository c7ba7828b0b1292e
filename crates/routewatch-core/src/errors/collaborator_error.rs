/// Failures reported by external collaborators (lookups, sample sources, sinks).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: &'static str,
        reason: String,
    },

    #[error("{collaborator} rejected request: {reason}")]
    Rejected {
        collaborator: &'static str,
        reason: String,
    },
}
