//! Service assembly: validate the configuration, then wire the store,
//! analyzer, and safety monitor to the external collaborators and spawn the
//! background loops.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use routewatch_core::config::RoutewatchConfig;
use routewatch_core::errors::ConfigError;
use routewatch_core::traits::{
    IBalanceLookup, IChannelStatsReader, IFeePolicyLookup, IPerformanceSource, IPolicySink,
};
use routewatch_observability::{evaluate_health, PipelineHealth, PipelineMetrics};
use routewatch_opportunity::{OpportunityAnalyzer, OpportunityScorer};
use routewatch_safety::SafetyMonitor;
use routewatch_stats::BoundedStatsStore;

use crate::backoff::Backoff;
use crate::maintenance;
use crate::pipeline::IngestionPipeline;
use crate::shutdown::Shutdown;

/// External systems the service talks to.
pub struct Collaborators {
    pub fee_lookup: Option<Arc<dyn IFeePolicyLookup>>,
    pub balance_lookup: Option<Arc<dyn IBalanceLookup>>,
    pub performance_source: Arc<dyn IPerformanceSource>,
    pub policy_sink: Arc<dyn IPolicySink>,
}

pub struct RoutewatchService {
    config: RoutewatchConfig,
    metrics: Arc<PipelineMetrics>,
    store: Arc<BoundedStatsStore>,
    analyzer: Arc<OpportunityAnalyzer>,
    monitor: Arc<SafetyMonitor>,
    performance_source: Arc<dyn IPerformanceSource>,
}

impl RoutewatchService {
    /// Build every component. Configuration invariant violations, such as a
    /// disabled eviction horizon, are returned here and are fatal.
    pub fn build(
        config: RoutewatchConfig,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let metrics = Arc::new(PipelineMetrics::new());

        let mut store =
            BoundedStatsStore::new(config.stats.clone()).with_metrics(Arc::clone(&metrics));
        let mut scorer = OpportunityScorer::new(config.scoring.clone());
        if let Some(lookup) = &collaborators.fee_lookup {
            store = store.with_fee_lookup(Arc::clone(lookup));
            scorer = scorer.with_fee_lookup(Arc::clone(lookup));
        }
        if let Some(lookup) = collaborators.balance_lookup {
            scorer = scorer.with_balance_lookup(lookup);
        }
        let store = Arc::new(store);

        let reader: Arc<dyn IChannelStatsReader> = store.clone();
        let analyzer = OpportunityAnalyzer::new(reader, scorer)
            .with_sink(Arc::clone(&collaborators.policy_sink))
            .with_metrics(Arc::clone(&metrics));
        let monitor = SafetyMonitor::new(config.safety.clone(), collaborators.policy_sink)
            .with_metrics(Arc::clone(&metrics));

        tracing::info!(
            max_channels = config.stats.max_channels,
            idle_horizon_secs = config.stats.idle_horizon_secs,
            "routewatch service built"
        );

        Ok(Self {
            config,
            metrics,
            store,
            analyzer: Arc::new(analyzer),
            monitor: Arc::new(monitor),
            performance_source: collaborators.performance_source,
        })
    }

    pub fn config(&self) -> &RoutewatchConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &Arc<BoundedStatsStore> {
        &self.store
    }

    pub fn analyzer(&self) -> &Arc<OpportunityAnalyzer> {
        &self.analyzer
    }

    pub fn monitor(&self) -> &Arc<SafetyMonitor> {
        &self.monitor
    }

    /// A fresh ingestion pipeline over this service's store. Register
    /// subscribers on it before running.
    pub fn ingestion_pipeline(&self) -> IngestionPipeline {
        IngestionPipeline::new(Arc::clone(&self.store), Arc::clone(&self.metrics))
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::from_config(&self.config.ingest)
    }

    /// Spawn the eviction, safety-sampling, and (if enabled) metrics loops.
    pub fn spawn_background(&self, shutdown: &Shutdown) -> Vec<JoinHandle<u64>> {
        let mut handles = vec![
            tokio::spawn(maintenance::run_eviction_loop(
                Arc::clone(&self.store),
                shutdown.clone(),
            )),
            tokio::spawn(maintenance::run_safety_sampling_loop(
                Arc::clone(&self.monitor),
                Arc::clone(&self.performance_source),
                shutdown.clone(),
            )),
        ];
        let metrics_secs = self.config.observability.metrics_log_interval_secs;
        if metrics_secs > 0 {
            handles.push(tokio::spawn(maintenance::run_metrics_loop(
                Arc::clone(&self.metrics),
                Duration::from_secs(metrics_secs),
                shutdown.clone(),
            )));
        }
        handles
    }

    pub fn health(&self) -> PipelineHealth {
        evaluate_health(&self.metrics.snapshot())
    }
}
