//! Layered configuration: compiled defaults, a TOML file, then `ROUTEWATCH_*`
//! environment overrides. Validation failures are fatal at startup.

pub mod defaults;
mod ingest_config;
mod observability_config;
mod safety_config;
mod scoring_config;
mod stats_config;

pub use ingest_config::IngestConfig;
pub use observability_config::ObservabilityConfig;
pub use safety_config::SafetyConfig;
pub use scoring_config::ScoringConfig;
pub use stats_config::StatsConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutewatchConfig {
    pub stats: StatsConfig,
    pub scoring: ScoringConfig,
    pub safety: SafetyConfig,
    pub ingest: IngestConfig,
    pub observability: ObservabilityConfig,
}

impl RoutewatchConfig {
    /// Load from a TOML file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config: RoutewatchConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string. Missing sections and keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `ROUTEWATCH_*` environment variables. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("ROUTEWATCH_IDLE_HORIZON_SECS").and_then(|s| s.parse().ok()) {
            self.stats.idle_horizon_secs = v;
        }
        if let Some(v) = lookup("ROUTEWATCH_MAX_CHANNELS").and_then(|s| s.parse().ok()) {
            self.stats.max_channels = v;
        }
        if let Some(v) = lookup("ROUTEWATCH_LOG_LEVEL") {
            self.observability.log_level = v;
        }
    }

    /// Check every invariant the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, secs) in [
            ("stats.idle_horizon_secs", self.stats.idle_horizon_secs),
            ("stats.eviction_interval_secs", self.stats.eviction_interval_secs),
            ("scoring.analysis_window_secs", self.scoring.analysis_window_secs),
            ("safety.sustained_breach_secs", self.safety.sustained_breach_secs),
            ("safety.max_sample_gap_secs", self.safety.max_sample_gap_secs),
            ("safety.observation_window_secs", self.safety.observation_window_secs),
            ("safety.sampling_interval_secs", self.safety.sampling_interval_secs),
            (
                "observability.metrics_log_interval_secs",
                self.observability.metrics_log_interval_secs,
            ),
        ] {
            if secs > defaults::MAX_DURATION_SECS {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: format!(
                        "{secs}s exceeds the maximum of {}s",
                        defaults::MAX_DURATION_SECS
                    ),
                });
            }
        }
        if self.stats.idle_horizon_secs == 0 {
            return Err(ConfigError::EvictionDisabled {
                field: "stats.idle_horizon_secs".to_string(),
            });
        }
        if self.stats.eviction_interval_secs == 0 {
            return Err(ConfigError::EvictionDisabled {
                field: "stats.eviction_interval_secs".to_string(),
            });
        }
        if self.stats.max_channels == 0 {
            return Err(ConfigError::EvictionDisabled {
                field: "stats.max_channels".to_string(),
            });
        }
        if self.stats.event_buffer_capacity == 0 {
            return Err(invalid("stats.event_buffer_capacity", "must be greater than 0"));
        }
        if self.scoring.analysis_window_secs == 0 {
            return Err(invalid("scoring.analysis_window_secs", "must be greater than 0"));
        }
        if !(self.scoring.fee_reduction_factor > 0.0 && self.scoring.fee_reduction_factor <= 1.0) {
            return Err(invalid("scoring.fee_reduction_factor", "must be in (0, 1]"));
        }
        if !is_fraction(self.safety.revenue_drop_threshold) {
            return Err(invalid("safety.revenue_drop_threshold", "must be in (0, 1]"));
        }
        if !is_fraction(self.safety.flow_drop_threshold) {
            return Err(invalid("safety.flow_drop_threshold", "must be in (0, 1]"));
        }
        if self.safety.sustained_breach_secs == 0 {
            return Err(invalid(
                "safety.sustained_breach_secs",
                "must be greater than 0; a single sample must never trigger rollback",
            ));
        }
        if self.safety.sustained_breach_secs > self.safety.observation_window_secs {
            return Err(invalid(
                "safety.sustained_breach_secs",
                "must not exceed safety.observation_window_secs",
            ));
        }
        if self.safety.max_sample_gap_secs == 0 {
            return Err(invalid("safety.max_sample_gap_secs", "must be greater than 0"));
        }
        if self.safety.sampling_interval_secs == 0 {
            return Err(invalid("safety.sampling_interval_secs", "must be greater than 0"));
        }
        if self.ingest.subscriber_queue_depth == 0 {
            return Err(invalid("ingest.subscriber_queue_depth", "must be greater than 0"));
        }
        if self.ingest.backoff_initial_ms == 0
            || self.ingest.backoff_max_ms < self.ingest.backoff_initial_ms
        {
            return Err(invalid(
                "ingest.backoff_max_ms",
                "must be at least ingest.backoff_initial_ms, which must be greater than 0",
            ));
        }
        if self.ingest.backoff_multiplier < 1.0 {
            return Err(invalid("ingest.backoff_multiplier", "must be at least 1.0"));
        }
        if !(0.0..1.0).contains(&self.ingest.backoff_jitter) {
            return Err(invalid("ingest.backoff_jitter", "must be in [0, 1)"));
        }
        Ok(())
    }
}

/// Whole seconds as a signed duration, saturating at `TimeDelta::MAX`.
pub(crate) fn secs_to_duration(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::TimeDelta::MAX)
}

fn is_fraction(v: f64) -> bool {
    v > 0.0 && v <= 1.0
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = [
            ("ROUTEWATCH_IDLE_HORIZON_SECS", "600"),
            ("ROUTEWATCH_MAX_CHANNELS", "not-a-number"),
            ("ROUTEWATCH_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = RoutewatchConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.stats.idle_horizon_secs, 600);
        assert_eq!(config.stats.max_channels, defaults::DEFAULT_MAX_CHANNELS);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn oversized_seconds_saturate_instead_of_wrapping() {
        assert_eq!(secs_to_duration(90), chrono::Duration::seconds(90));
        assert_eq!(secs_to_duration(u64::MAX), chrono::TimeDelta::MAX);
        assert_eq!(secs_to_duration(10u64.pow(16)), chrono::TimeDelta::MAX);
        assert!(secs_to_duration(u64::MAX) > chrono::Duration::zero());
    }
}
