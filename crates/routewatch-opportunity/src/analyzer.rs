//! OpportunityAnalyzer: scores every tracked channel through the stats read
//! interface and surfaces ranked opportunities, reports, and instructions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use routewatch_core::errors::RoutewatchResult;
use routewatch_core::models::{ChannelId, OpportunityScore, PolicyInstruction, TimeRange};
use routewatch_core::traits::{IChannelStatsReader, IPolicySink};
use routewatch_observability::tracing_setup::events;
use routewatch_observability::PipelineMetrics;

use crate::ranking;
use crate::report::OpportunityReport;
use crate::scorer::OpportunityScorer;

pub struct OpportunityAnalyzer {
    reader: Arc<dyn IChannelStatsReader>,
    scorer: OpportunityScorer,
    sink: Option<Arc<dyn IPolicySink>>,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl OpportunityAnalyzer {
    pub fn new(reader: Arc<dyn IChannelStatsReader>, scorer: OpportunityScorer) -> Self {
        Self {
            reader,
            scorer,
            sink: None,
            metrics: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn IPolicySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn scorer(&self) -> &OpportunityScorer {
        &self.scorer
    }

    /// The configured analysis window ending at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> RoutewatchResult<TimeRange> {
        TimeRange::ending_at(now, self.scorer.config().analysis_window())
    }

    /// Score a single channel. `Ok(None)` if it is untracked or below thresholds.
    pub fn score_channel(
        &self,
        channel_id: ChannelId,
        now: DateTime<Utc>,
    ) -> RoutewatchResult<Option<OpportunityScore>> {
        let window = self.window(now)?;
        Ok(self
            .reader
            .get(channel_id)
            .and_then(|stats| self.scorer.score(&stats, window)))
    }

    /// The detection pass: every opportunity in the window, ranked. Each
    /// call logs one `opportunity_detected` event per result and adds them to
    /// the detection counter. The views below rank silently.
    #[instrument(skip(self))]
    pub fn analyze(&self, now: DateTime<Utc>) -> RoutewatchResult<Vec<OpportunityScore>> {
        let window = self.window(now)?;
        let (analyzed, scores) = self.rank_window(window);
        for s in &scores {
            events::opportunity_detected(
                s.channel_id,
                s.recommended_action,
                s.urgency_score,
                s.missed_fee_estimate_msat,
            );
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_opportunities(scores.len());
        }
        tracing::debug!(analyzed, opportunities = scores.len(), "analysis pass complete");
        Ok(scores)
    }

    fn ranked(&self, now: DateTime<Utc>) -> RoutewatchResult<Vec<OpportunityScore>> {
        Ok(self.rank_window(self.window(now)?).1)
    }

    /// The `n` most urgent opportunities.
    pub fn top_opportunities(
        &self,
        now: DateTime<Utc>,
        n: usize,
    ) -> RoutewatchResult<Vec<OpportunityScore>> {
        let mut ranked = self.ranked(now)?;
        ranked.truncate(n);
        Ok(ranked)
    }

    pub fn liquidity_opportunities(&self, now: DateTime<Utc>) -> RoutewatchResult<Vec<OpportunityScore>> {
        Ok(ranking::liquidity_opportunities(&self.ranked(now)?))
    }

    pub fn fee_opportunities(&self, now: DateTime<Utc>) -> RoutewatchResult<Vec<OpportunityScore>> {
        Ok(ranking::fee_opportunities(&self.ranked(now)?))
    }

    pub fn capacity_opportunities(&self, now: DateTime<Utc>) -> RoutewatchResult<Vec<OpportunityScore>> {
        Ok(ranking::capacity_opportunities(&self.ranked(now)?))
    }

    pub fn report(&self, now: DateTime<Utc>) -> RoutewatchResult<OpportunityReport> {
        let window = self.window(now)?;
        let (analyzed, ranked) = self.rank_window(window);
        Ok(OpportunityReport::build(
            now,
            window,
            analyzed,
            &ranked,
            self.scorer.config().top_n,
        ))
    }

    /// Submit a `Recommend` instruction for each of the top-N opportunities.
    /// Sink failures are logged and skipped. Returns how many were accepted.
    #[instrument(skip(self))]
    pub fn emit_recommendations(&self, now: DateTime<Utc>) -> RoutewatchResult<usize> {
        let Some(sink) = &self.sink else {
            return Ok(0);
        };
        let window = self.window(now)?;
        let top = self.top_opportunities(now, self.scorer.config().top_n)?;

        let mut delivered = 0;
        for score in top {
            let suggested_policy = score.suggested_fee_rate_ppm.and_then(|ppm| {
                self.scorer
                    .current_policy(score.channel_id, window)
                    .map(|p| p.with_fee_rate_ppm(ppm))
            });
            let instruction = PolicyInstruction::Recommend {
                channel_id: score.channel_id,
                action: score.recommended_action,
                urgency_score: score.urgency_score,
                suggested_policy,
            };
            match sink.submit(instruction) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    channel_id = %score.channel_id,
                    error = %e,
                    "policy sink rejected recommendation"
                ),
            }
        }
        Ok(delivered)
    }

    /// Returns (channels analyzed, ranked opportunities).
    fn rank_window(&self, window: TimeRange) -> (usize, Vec<OpportunityScore>) {
        let snapshot = self.reader.snapshot_all();
        let analyzed = snapshot.len();
        let mut scores: Vec<OpportunityScore> = snapshot
            .iter()
            .filter_map(|stats| self.scorer.score(stats, window))
            .collect();
        ranking::rank(&mut scores);
        (analyzed, scores)
    }
}
