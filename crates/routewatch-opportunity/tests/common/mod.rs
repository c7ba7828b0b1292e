#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use routewatch_core::config::{ScoringConfig, StatsConfig};
use routewatch_core::errors::{CollaboratorError, RoutewatchResult};
use routewatch_core::models::{ChannelId, FeePolicy, ForwardingEvent, PolicyInstruction, RecommendedAction};
use routewatch_core::traits::{IBalanceLookup, IFeePolicyLookup, IPolicySink};
use routewatch_opportunity::{OpportunityAnalyzer, OpportunityScorer};
use routewatch_stats::BoundedStatsStore;

pub struct FixedFee(pub u32);

impl IFeePolicyLookup for FixedFee {
    fn fee_policy(&self, _: ChannelId, _: DateTime<Utc>) -> RoutewatchResult<Option<FeePolicy>> {
        Ok(Some(FeePolicy::new(1_000, self.0)))
    }
}

#[derive(Default)]
pub struct Balances(pub HashMap<ChannelId, f64>);

impl IBalanceLookup for Balances {
    fn local_balance_ratio(&self, channel_id: ChannelId) -> RoutewatchResult<Option<f64>> {
        Ok(self.0.get(&channel_id).copied())
    }
}

pub struct FailingBalances;

impl IBalanceLookup for FailingBalances {
    fn local_balance_ratio(&self, _: ChannelId) -> RoutewatchResult<Option<f64>> {
        Err(CollaboratorError::Unavailable {
            collaborator: "balance_lookup",
            reason: "node unreachable".into(),
        }
        .into())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub submitted: Mutex<Vec<PolicyInstruction>>,
    pub reject_channel: Option<ChannelId>,
}

impl IPolicySink for RecordingSink {
    fn submit(&self, instruction: PolicyInstruction) -> RoutewatchResult<()> {
        if Some(instruction.channel_id()) == self.reject_channel {
            return Err(CollaboratorError::Rejected {
                collaborator: "policy_sink",
                reason: "channel locked".into(),
            }
            .into());
        }
        self.submitted.lock().unwrap().push(instruction);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub now: DateTime<Utc>,
    pub fee_rate_ppm: u32,
    pub balance_ratios: Vec<(ChannelId, f64)>,
    pub events: Vec<ForwardingEvent>,
    pub expected: Vec<Expected>,
}

#[derive(Debug, Deserialize)]
pub struct Expected {
    pub channel_id: ChannelId,
    pub recommended_action: RecommendedAction,
    pub failure_count: u64,
    pub success_count: u64,
    pub missed_fee_estimate_msat: u64,
    pub urgency_score: f64,
    pub suggested_fee_rate_ppm: Option<u32>,
}

pub fn load_scenario(name: &str) -> Scenario {
    test_fixtures::load_golden("opportunity", name)
}

/// Store filled with the scenario's events plus an analyzer wired to its lookups.
pub fn analyzer_for(scenario: &Scenario) -> (Arc<BoundedStatsStore>, OpportunityAnalyzer) {
    let store = Arc::new(BoundedStatsStore::new(StatsConfig::default()));
    for event in &scenario.events {
        store.record(event.clone());
    }
    let scorer = OpportunityScorer::new(ScoringConfig::default())
        .with_fee_lookup(Arc::new(FixedFee(scenario.fee_rate_ppm)))
        .with_balance_lookup(Arc::new(Balances(
            scenario.balance_ratios.iter().copied().collect(),
        )));
    let analyzer = OpportunityAnalyzer::new(store.clone(), scorer);
    (store, analyzer)
}
