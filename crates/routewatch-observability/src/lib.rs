//! # routewatch-observability
//!
//! Structured tracing setup and per-event log helpers, lock-free pipeline
//! counters with a serializable snapshot, and a health summary derived from
//! those counters.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::{evaluate_health, HealthStatus, PipelineHealth};
pub use metrics::{PipelineMetrics, PipelineMetricsSnapshot};
