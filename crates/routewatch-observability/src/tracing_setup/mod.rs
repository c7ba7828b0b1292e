//! Tracing setup: structured JSON logging filtered by `ROUTEWATCH_LOG`.

pub mod events;

use routewatch_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter.
pub const LOG_ENV_VAR: &str = "ROUTEWATCH_LOG";

/// Install the global subscriber with JSON output, filtered by
/// `ROUTEWATCH_LOG` (default `info`). Returns `false` if one was already set.
pub fn init_tracing() -> bool {
    install(env_filter_or("info"), true)
}

/// Install the global JSON subscriber with an explicit filter, ignoring the
/// environment.
pub fn init_tracing_with_filter(filter: &str) -> bool {
    install(EnvFilter::new(filter), true)
}

/// Install from the `[observability]` config section. `ROUTEWATCH_LOG`
/// still wins over `log_level` when set.
pub fn init_from_config(config: &ObservabilityConfig) -> bool {
    install(env_filter_or(&config.log_level), config.json_logs)
}

fn env_filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn install(filter: EnvFilter, json: bool) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);
    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
