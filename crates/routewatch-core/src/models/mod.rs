mod category;
mod channel_id;
mod channel_stats;
mod event;
mod fee_policy;
mod instruction;
mod opportunity;
mod performance;
mod policy_change;
mod time_range;

pub use category::CausalCategory;
pub use channel_id::ChannelId;
pub use channel_stats::ChannelFailureStats;
pub use event::{ClassifiedEvent, FailureCause, ForwardOutcome, ForwardingEvent};
pub use fee_policy::FeePolicy;
pub use instruction::PolicyInstruction;
pub use opportunity::{OpportunityScore, RecommendedAction, UrgencyBreakdown};
pub use performance::PerformanceSample;
pub use policy_change::{AppliedPolicyChange, ChangeId, ChangeStatus, RollbackReason};
pub use time_range::TimeRange;
