use crate::errors::RoutewatchResult;
use crate::models::PolicyInstruction;

/// Receives recommendation and rollback instructions for application.
pub trait IPolicySink: Send + Sync {
    fn submit(&self, instruction: PolicyInstruction) -> RoutewatchResult<()>;
}
