/// routewatch version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Millisatoshis per satoshi.
pub const MSAT_PER_SAT: u64 = 1_000;

/// Proportional fee rates are expressed in parts-per-million.
pub const PPM_DENOMINATOR: u64 = 1_000_000;

/// Days used when extrapolating missed revenue to a monthly figure.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Upper bound of the urgency scale.
pub const MAX_URGENCY_SCORE: f64 = 100.0;
