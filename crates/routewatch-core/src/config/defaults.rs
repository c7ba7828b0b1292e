// Single source of truth for all default values.

/// Upper bound on any configured duration (ten years).
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 86_400;

// --- Stats store ---
pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 100;
pub const DEFAULT_MAX_CHANNELS: usize = 10_000;
pub const DEFAULT_IDLE_HORIZON_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_EVICTION_INTERVAL_SECS: u64 = 3_600; // 1 hour

// --- Scoring ---
pub const DEFAULT_MIN_FAILURE_COUNT: u64 = 3;
pub const DEFAULT_MIN_MISSED_FEE_MSAT: u64 = 100_000; // 100 sat
pub const DEFAULT_ANALYSIS_WINDOW_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_FEE_REDUCTION_FACTOR: f64 = 0.7;
pub const DEFAULT_MIN_SUGGESTED_FEE_PPM: u32 = 1;

// --- Safety monitor ---
pub const DEFAULT_REVENUE_DROP_THRESHOLD: f64 = 0.30;
pub const DEFAULT_FLOW_DROP_THRESHOLD: f64 = 0.60;
pub const DEFAULT_SUSTAINED_BREACH_SECS: u64 = 14_400; // 4 hours
pub const DEFAULT_MAX_SAMPLE_GAP_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_OBSERVATION_WINDOW_SECS: u64 = 172_800; // 48 hours
pub const DEFAULT_CLOSED_HISTORY_LIMIT: usize = 1_000;
pub const DEFAULT_SAMPLING_INTERVAL_SECS: u64 = 900; // 15 minutes

// --- Ingest ---
pub const DEFAULT_SUBSCRIBER_QUEUE_DEPTH: usize = 1_024;
pub const DEFAULT_BACKOFF_INITIAL_MS: u64 = 500;
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 60_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_BACKOFF_JITTER: f64 = 0.2;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
pub const DEFAULT_METRICS_LOG_INTERVAL_SECS: u64 = 300;
