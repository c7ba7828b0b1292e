//! # routewatch-safety
//!
//! Watches applied fee-policy changes and reverts any whose revenue or flow
//! stays below its guardrail for a sustained sub-window. Changes that survive
//! the full observation window are confirmed.

pub mod breach;
pub mod monitor;

pub use breach::{BreachTracker, SampleOutcome};
pub use monitor::SafetyMonitor;
