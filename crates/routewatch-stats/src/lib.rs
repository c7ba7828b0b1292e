//! # routewatch-stats
//!
//! Bounded Channel Statistics Store: one rolling aggregate per channel, held
//! in a `DashMap` so distinct channels update in parallel while each
//! aggregate is mutated atomically as a unit.

pub mod fee_estimate;
pub mod store;
pub mod summary;

pub use store::BoundedStatsStore;
pub use summary::StoreSummary;
