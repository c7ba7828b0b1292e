use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};

use routewatch_core::config::StatsConfig;
use routewatch_core::errors::{CollaboratorError, RoutewatchError, RoutewatchResult};
use routewatch_core::models::{CausalCategory, ChannelId, ClassifiedEvent};
use routewatch_core::traits::IEventSink;
use routewatch_ingest::{
    shutdown_channel, Backoff, Fanout, IEventSource, IngestionPipeline, RawForwardingRecord,
    ShutdownTrigger,
};
use routewatch_observability::PipelineMetrics;
use routewatch_stats::BoundedStatsStore;

fn record(channel: &str, settled: bool) -> RawForwardingRecord {
    RawForwardingRecord {
        timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        incoming_channel_id: Some("700000x1x0".into()),
        outgoing_channel_id: Some(channel.into()),
        amount_msat: Some(1_000_000),
        fee_msat: Some(100),
        settled: Some(settled),
        failure_code: None,
        failure_cause: (!settled).then(|| "insufficient_balance".to_string()),
    }
}

fn malformed() -> RawForwardingRecord {
    RawForwardingRecord {
        outgoing_channel_id: Some("garbage".into()),
        amount_msat: Some(1),
        settled: Some(true),
        ..RawForwardingRecord::default()
    }
}

fn pipeline() -> (IngestionPipeline, Arc<BoundedStatsStore>, Arc<PipelineMetrics>) {
    let metrics = Arc::new(PipelineMetrics::new());
    let store = Arc::new(BoundedStatsStore::new(StatsConfig::default()));
    (
        IngestionPipeline::new(Arc::clone(&store), Arc::clone(&metrics)),
        store,
        metrics,
    )
}

fn channel(s: &str) -> ChannelId {
    s.parse().unwrap()
}

// ── Test doubles ──────────────────────────────────────────────────────────

enum Step {
    Record(RawForwardingRecord),
    Fail,
    End,
}

/// Replays a script, then fires shutdown and waits forever.
struct ScriptedSource {
    steps: VecDeque<Step>,
    reconnect_failures: u32,
    reconnects: u32,
    on_exhausted: Option<ShutdownTrigger>,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>, on_exhausted: Option<ShutdownTrigger>) -> Self {
        Self {
            steps: steps.into(),
            reconnect_failures: 0,
            reconnects: 0,
            on_exhausted,
        }
    }
}

impl IEventSource for ScriptedSource {
    async fn next_record(&mut self) -> RoutewatchResult<Option<RawForwardingRecord>> {
        match self.steps.pop_front() {
            Some(Step::Record(raw)) => Ok(Some(raw)),
            Some(Step::Fail) => Err(CollaboratorError::Unavailable {
                collaborator: "event_source",
                reason: "connection reset".into(),
            }
            .into()),
            Some(Step::End) => Ok(None),
            None => {
                if let Some(trigger) = self.on_exhausted.take() {
                    trigger.trigger();
                }
                std::future::pending::<RoutewatchResult<Option<RawForwardingRecord>>>().await
            }
        }
    }

    async fn reconnect(&mut self) -> RoutewatchResult<()> {
        self.reconnects += 1;
        if self.reconnect_failures > 0 {
            self.reconnect_failures -= 1;
            return Err(RoutewatchError::CollaboratorError(
                CollaboratorError::Unavailable {
                    collaborator: "event_source",
                    reason: "still down".into(),
                },
            ));
        }
        Ok(())
    }
}

struct RecordingEventSink {
    name: String,
    seen: Mutex<Vec<ClassifiedEvent>>,
    fail: bool,
}

impl RecordingEventSink {
    fn new(name: &str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            seen: Mutex::new(Vec::new()),
            fail,
        })
    }
}

impl IEventSink for RecordingEventSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, event: &ClassifiedEvent) -> RoutewatchResult<()> {
        self.seen.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(CollaboratorError::Rejected {
                collaborator: "event_sink",
                reason: "boom".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// Blocks inside `accept` until the gate's sender is dropped or `hold`
/// elapses.
struct GatedSink {
    name: String,
    seen: AtomicUsize,
    gate: Mutex<mpsc::Receiver<()>>,
    hold: Duration,
}

impl GatedSink {
    fn new(name: &str, hold: Duration) -> (Arc<Self>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let sink = Arc::new(Self {
            name: name.to_string(),
            seen: AtomicUsize::new(0),
            gate: Mutex::new(rx),
            hold,
        });
        (sink, tx)
    }
}

impl IEventSink for GatedSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, _event: &ClassifiedEvent) -> RoutewatchResult<()> {
        let _ = self.gate.lock().unwrap().recv_timeout(self.hold);
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Direct ingestion ──────────────────────────────────────────────────────

#[test]
fn ingest_classifies_and_records() {
    let (pipeline, store, metrics) = pipeline();
    let event = pipeline.ingest(record("800000x5x1", false), Utc::now()).unwrap();
    assert_eq!(event.category, Some(CausalCategory::InsufficientLiquidity));
    assert_eq!(event.channel_id, channel("800000x5x1"));

    let ok = pipeline.ingest(record("800000x5x1", true), Utc::now()).unwrap();
    assert_eq!(ok.category, None);

    let stats = store.get(channel("800000x5x1")).unwrap();
    assert_eq!(stats.total_failures(), 1);
    assert_eq!(stats.total_successes(), 1);
    assert_eq!(metrics.snapshot().events_accepted, 2);
}

#[test]
fn rejected_record_never_reaches_store() {
    let (pipeline, store, metrics) = pipeline();
    assert!(pipeline.ingest(malformed(), Utc::now()).is_err());
    assert!(store.is_empty());
    let snap = metrics.snapshot();
    assert_eq!(snap.events_rejected.get("invalid_channel_id"), Some(&1));
    assert_eq!(snap.events_accepted, 0);
}

// ── Run loop ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn run_processes_until_shutdown() {
    let (pipeline, store, _) = pipeline();
    let (trigger, shutdown) = shutdown_channel();
    let mut source = ScriptedSource::new(
        vec![
            Step::Record(record("800000x1x0", false)),
            Step::Record(malformed()),
            Step::Record(record("800000x2x0", true)),
        ],
        Some(trigger),
    );

    let summary = pipeline.run(&mut source, Backoff::default(), shutdown).await;
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.reconnects, 0);
    assert_eq!(store.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn errors_and_end_of_stream_reconnect() {
    let (pipeline, store, metrics) = pipeline();
    let (trigger, shutdown) = shutdown_channel();
    let mut source = ScriptedSource::new(
        vec![
            Step::Record(record("800000x1x0", false)),
            Step::Fail,
            Step::Record(record("800000x1x0", false)),
            Step::End,
            Step::Record(record("800000x1x0", false)),
        ],
        Some(trigger),
    );
    source.reconnect_failures = 2;

    let summary = pipeline.run(&mut source, Backoff::default(), shutdown).await;
    // First outage needs three attempts, the second one.
    assert_eq!(source.reconnects, 4);
    assert_eq!(summary.reconnects, 4);
    assert_eq!(summary.accepted, 3);
    assert_eq!(metrics.snapshot().source_reconnects, 4);
    assert_eq!(store.get(channel("800000x1x0")).unwrap().total_failures(), 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_backoff_wait() {
    let (pipeline, _, _) = pipeline();
    let (trigger, shutdown) = shutdown_channel();
    // The source stays down; only shutdown ends the loop.
    let mut source = ScriptedSource::new(vec![Step::Fail], None);
    source.reconnect_failures = u32::MAX;

    let handle = tokio::spawn(async move {
        let summary = pipeline
            .run(
                &mut source,
                Backoff::new(Duration::from_secs(10), Duration::from_secs(10), 1.0, 0.0),
                shutdown,
            )
            .await;
        (summary, source.reconnects)
    });

    tokio::time::sleep(Duration::from_secs(35)).await;
    trigger.trigger();
    let (summary, reconnects) = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop stops promptly")
        .unwrap();
    // Attempts at 10s, 20s and 30s failed; the 40s wait was cut short.
    assert_eq!(reconnects, 3);
    assert_eq!(summary.accepted, 0);
}

#[tokio::test(start_paused = true)]
async fn preset_shutdown_stops_immediately() {
    let (pipeline, store, _) = pipeline();
    let (trigger, shutdown) = shutdown_channel();
    let second = trigger.subscribe();
    trigger.trigger();
    let mut source =
        ScriptedSource::new(vec![Step::Record(record("800000x1x0", true))], Some(trigger));

    let summary = pipeline.run(&mut source, Backoff::default(), shutdown).await;
    assert_eq!(summary.accepted, 0);
    assert!(store.is_empty());
    assert!(second.is_triggered());
}

// ── Fan-out ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribers_receive_classified_events() {
    let (mut pipeline, _, _) = pipeline();
    let a = RecordingEventSink::new("a", false);
    let b = RecordingEventSink::new("b", false);
    pipeline.subscribe(a.clone(), 16);
    pipeline.subscribe(b.clone(), 16);

    pipeline.ingest(record("800000x1x0", false), Utc::now()).unwrap();
    pipeline.ingest(record("800000x1x0", true), Utc::now()).unwrap();
    pipeline.shutdown().await;

    for sink in [&a, &b] {
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 2, "{}", sink.name);
        assert_eq!(seen[0].category, Some(CausalCategory::InsufficientLiquidity));
    }
}

#[tokio::test]
async fn failing_subscriber_does_not_affect_others() {
    let metrics = Arc::new(PipelineMetrics::new());
    let mut fanout = Fanout::new(Arc::clone(&metrics));
    let bad = RecordingEventSink::new("bad", true);
    let good = RecordingEventSink::new("good", false);
    fanout.subscribe(bad.clone(), 8);
    fanout.subscribe(good.clone(), 8);

    let (pipeline, _, _) = pipeline();
    for _ in 0..3 {
        let event = pipeline.ingest(record("800000x1x0", false), Utc::now()).unwrap();
        assert_eq!(fanout.publish(event), 2);
    }
    fanout.shutdown().await;

    assert_eq!(good.seen.lock().unwrap().len(), 3);
    assert_eq!(bad.seen.lock().unwrap().len(), 3);
    assert_eq!(metrics.snapshot().subscriber_errors, 3);
}

#[tokio::test]
async fn full_queue_drops_for_that_subscriber_only() {
    let metrics = Arc::new(PipelineMetrics::new());
    let mut fanout = Fanout::new(Arc::clone(&metrics));
    let (slow, gate) = GatedSink::new("slow", Duration::from_secs(5));
    let roomy = RecordingEventSink::new("roomy", false);
    fanout.subscribe(slow.clone(), 1);
    fanout.subscribe(roomy.clone(), 64);

    let (pipeline, _, _) = pipeline();
    // The slow sink holds at most one event in hand and one queued.
    for _ in 0..10 {
        let event = pipeline.ingest(record("800000x1x0", true), Utc::now()).unwrap();
        fanout.publish(event);
    }
    drop(gate);
    fanout.shutdown().await;

    let seen = slow.seen.load(Ordering::SeqCst);
    let snap = metrics.snapshot();
    let drops = *snap.subscriber_drops.get("slow").unwrap();
    assert!((1..=2).contains(&seen), "slow saw {seen}");
    assert_eq!(seen as u64 + drops, 10);
    assert_eq!(roomy.seen.lock().unwrap().len(), 10);
    assert_eq!(snap.subscriber_drops.get("roomy"), None);
}

#[tokio::test]
async fn blocking_subscriber_does_not_stall_ingestion() {
    // Current-thread runtime: a sink blocking on an async worker would
    // stall the run loop for `hold` per record.
    let (mut pipeline, store, _) = pipeline();
    let (sink, gate) = GatedSink::new("blocking", Duration::from_secs(2));
    pipeline.subscribe(sink.clone(), 16);

    let (trigger, shutdown) = shutdown_channel();
    let mut source = ScriptedSource::new(
        (0..5)
            .map(|_| Step::Record(record("800000x1x0", false)))
            .collect(),
        Some(trigger),
    );

    let started = Instant::now();
    let summary = pipeline.run(&mut source, Backoff::default(), shutdown).await;
    let elapsed = started.elapsed();

    assert_eq!(summary.accepted, 5);
    assert!(elapsed < Duration::from_secs(1), "ingestion took {elapsed:?}");
    assert_eq!(store.get(channel("800000x1x0")).unwrap().total_failures(), 5);

    drop(gate);
    pipeline.shutdown().await;
    assert_eq!(sink.seen.load(Ordering::SeqCst), 5);
}

#[test]
fn publish_without_subscribers_is_noop() {
    let fanout = Fanout::new(Arc::new(PipelineMetrics::new()));
    let (pipeline, _, _) = pipeline();
    let event = pipeline.ingest(record("800000x1x0", true), Utc::now()).unwrap();
    assert_eq!(fanout.publish(event), 0);
    assert!(fanout.is_empty());
}
