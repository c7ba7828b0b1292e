//! Periodic background loops: idle-channel eviction, safety-monitor
//! sampling, and metrics reporting. Each runs until shutdown and finishes
//! its current iteration before stopping.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, MissedTickBehavior};

use routewatch_core::traits::IPerformanceSource;
use routewatch_observability::tracing_setup::events;
use routewatch_observability::{evaluate_health, HealthStatus, PipelineMetrics};
use routewatch_safety::SafetyMonitor;
use routewatch_stats::BoundedStatsStore;

use crate::shutdown::Shutdown;

/// Ticks every `period` (first tick after one full period) until shutdown.
/// Returns the number of completed iterations.
async fn every<F>(period: Duration, mut shutdown: Shutdown, mut body: F) -> u64
where
    F: FnMut() -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>,
{
    if period.is_zero() {
        tracing::warn!("zero loop period, background loop not started");
        return 0;
    }
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut iterations = 0;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            _ = ticker.tick() => {}
        }
        body().await;
        iterations += 1;
    }
    iterations
}

/// Evict channels idle past the store's configured horizon every
/// `eviction_interval`.
pub async fn run_eviction_loop(store: Arc<BoundedStatsStore>, shutdown: Shutdown) -> u64 {
    let period = store.config().eviction_interval();
    tracing::info!(interval_secs = period.as_secs(), "eviction loop started");
    every(period, shutdown, move || {
        let store = Arc::clone(&store);
        Box::pin(async move {
            let evicted = store.evict_idle_default(Utc::now());
            tracing::debug!(evicted, remaining = store.len(), "eviction pass complete");
        })
    })
    .await
}

/// Pull performance samples for every active policy change each sampling
/// interval. Sampling calls out to the performance source, so it runs on the
/// blocking pool.
pub async fn run_safety_sampling_loop(
    monitor: Arc<SafetyMonitor>,
    source: Arc<dyn IPerformanceSource>,
    shutdown: Shutdown,
) -> u64 {
    let period = monitor.config().sampling_interval();
    tracing::info!(interval_secs = period.as_secs(), "safety sampling loop started");
    every(period, shutdown, move || {
        let monitor = Arc::clone(&monitor);
        let source = Arc::clone(&source);
        Box::pin(async move {
            let result =
                tokio::task::spawn_blocking(move || monitor.sample_all(source.as_ref(), Utc::now()))
                    .await;
            match result {
                Ok(outcomes) => {
                    tracing::debug!(samples = outcomes.len(), "safety sampling pass complete");
                }
                Err(e) => tracing::error!(error = %e, "safety sampling pass panicked"),
            }
        })
    })
    .await
}

/// Log a metrics snapshot and the derived health every `period`.
pub async fn run_metrics_loop(
    metrics: Arc<PipelineMetrics>,
    period: Duration,
    shutdown: Shutdown,
) -> u64 {
    every(period, shutdown, move || {
        let metrics = Arc::clone(&metrics);
        Box::pin(async move {
            let snapshot = metrics.snapshot();
            events::metrics_reported(&snapshot);
            let health = evaluate_health(&snapshot);
            if health.status != HealthStatus::Healthy {
                tracing::warn!(
                    status = ?health.status,
                    reasons = ?health.reasons,
                    "pipeline health degraded"
                );
            }
        })
    })
    .await
}
