//! # routewatch-opportunity
//!
//! Turns per-channel failure statistics into ranked, actionable
//! opportunities: classify raw causes, score each channel over an analysis
//! window, map the dominant cause to an action, and rank across channels.

pub mod analyzer;
pub mod classifier;
pub mod ranking;
pub mod recommendation;
pub mod report;
pub mod scorer;
pub mod urgency;

pub use analyzer::OpportunityAnalyzer;
pub use classifier::classify;
pub use report::OpportunityReport;
pub use scorer::{OpportunityScorer, ScoringThresholds};
