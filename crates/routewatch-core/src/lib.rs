//! # routewatch-core
//!
//! Foundation crate for routewatch.
//! Defines the event model, aggregates, policy-change records, errors, config,
//! collaborator traits, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::RoutewatchConfig;
pub use errors::{RoutewatchError, RoutewatchResult};
pub use models::{
    AppliedPolicyChange, CausalCategory, ChangeId, ChangeStatus, ChannelFailureStats, ChannelId,
    ClassifiedEvent, FailureCause, FeePolicy, ForwardOutcome, ForwardingEvent, OpportunityScore,
    PerformanceSample, PolicyInstruction, RecommendedAction, RollbackReason, TimeRange,
    UrgencyBreakdown,
};
