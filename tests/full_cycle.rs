//! End-to-end monitoring tests
//!
//! Drives the supervisor + monitor pipeline with a scripted quote source
//! and a recording notification sink:
//! 1. Seed-then-alert-then-quiet detection sequence
//! 2. Per-symbol failure isolation inside a cycle
//! 3. Cross-subscriber shared-baseline behavior
//! 4. Replace / stop / unsubscribe lifecycle
//!
//! # Running the tests
//! ```bash
//! cargo test --test full_cycle
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use quotewatch::config::SubscriberConfig;
use quotewatch::core::types::{AnomalyDecision, Observation};
use quotewatch::core::{LastObservationTable, MonitorContext, MonitorSupervisor};
use quotewatch::notify::NotificationSink;
use quotewatch::source::{FetchError, FetchResult, QuoteSource};
use quotewatch::store::{MemoryStore, Store};

// =============================================================================
// Scripted quote source
// =============================================================================

/// Quote source that replays a fixed per-symbol value script
///
/// Each fetch consumes the next value for its symbol; an exhausted (or
/// deliberately empty) script fails with `TransientUnavailable`, which
/// holds the baseline still without producing further alerts.
#[derive(Default)]
struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self::default()
    }

    fn with_values(self, symbol: &str, values: &[f64]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(symbol.to_string(), values.iter().copied().collect());
        self
    }

    /// Register a symbol whose every fetch fails
    fn with_failures(self, symbol: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(symbol.to_string(), VecDeque::new());
        self
    }
}

#[async_trait]
impl QuoteSource for ScriptedSource {
    async fn fetch(&self, _credential: &str, symbol: &str) -> FetchResult<Observation> {
        let next = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(symbol) {
                Some(values) => values.pop_front(),
                None => return Err(FetchError::SymbolNotFound(symbol.to_string())),
            }
        };
        match next {
            Some(value) => Ok(Observation::now(symbol, value)),
            None => Err(FetchError::TransientUnavailable(format!(
                "script exhausted for {}",
                symbol
            ))),
        }
    }
}

// =============================================================================
// Recording notification sink
// =============================================================================

#[derive(Default)]
struct RecordingSink {
    alerts: Mutex<Vec<(String, AnomalyDecision)>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn alerts(&self) -> Vec<(String, AnomalyDecision)> {
        self.alerts.lock().unwrap().clone()
    }

    fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn alert(&self, subscriber_id: &str, decision: &AnomalyDecision) {
        self.alerts
            .lock()
            .unwrap()
            .push((subscriber_id.to_string(), decision.clone()));
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    supervisor: MonitorSupervisor,
    store: Arc<MemoryStore>,
    sink: Arc<RecordingSink>,
    table: Arc<LastObservationTable>,
}

fn harness(source: ScriptedSource) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let sink = RecordingSink::new();
    let table = Arc::new(LastObservationTable::new());
    let ctx = MonitorContext {
        source: Arc::new(source),
        store: Arc::clone(&store) as Arc<dyn Store>,
        sink: Arc::clone(&sink) as Arc<dyn NotificationSink>,
        table: Arc::clone(&table),
    };
    Harness {
        supervisor: MonitorSupervisor::new(ctx),
        store,
        sink,
        table,
    }
}

fn subscriber(id: &str, symbols: &[&str], threshold: f64) -> SubscriberConfig {
    SubscriberConfig {
        id: id.to_string(),
        credential: "tok".to_string(),
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        interval_secs: 1,
        threshold_percent: threshold,
    }
}

/// Poll `cond` until it holds or the deadline passes
async fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_seed_then_alert_then_quiet() {
    // Cycle 1: 100 seeds. Cycle 2: 106 is a 6% move over a 5% threshold.
    // Cycle 3: 107 vs 106 is ~0.94%, under threshold.
    let h = harness(ScriptedSource::new().with_values("AAA", &[100.0, 106.0, 107.0]));
    let config = subscriber("s1", &["AAA"], 5.0);
    h.store.upsert_subscriber(config.clone()).await.unwrap();
    h.supervisor.start_or_replace(config).await.unwrap();

    let sink = Arc::clone(&h.sink);
    assert!(
        wait_until(Duration::from_secs(5), || sink.alert_count() >= 1).await,
        "expected one alert for the 6% move"
    );

    // Let cycle 3 run; the small move must not fire.
    sleep(Duration::from_millis(2_500)).await;
    let alerts = h.sink.alerts();
    assert_eq!(alerts.len(), 1, "only the 6% move should alert");

    let (subscriber_id, decision) = &alerts[0];
    assert_eq!(subscriber_id, "s1");
    assert_eq!(decision.symbol, "AAA");
    assert_eq!(decision.previous_value, Some(100.0));
    assert_eq!(decision.current_value, 106.0);
    assert!((decision.change_percent - 6.0).abs() < 1e-9);

    h.supervisor.shutdown_all().await;
}

#[tokio::test]
async fn test_fetch_failure_does_not_block_sibling_symbol() {
    // AAA always fails; BBB moves 100 → 110 (10% over a 5% threshold).
    let h = harness(
        ScriptedSource::new()
            .with_failures("AAA")
            .with_values("BBB", &[100.0, 110.0]),
    );
    let config = subscriber("s1", &["AAA", "BBB"], 5.0);
    h.store.upsert_subscriber(config.clone()).await.unwrap();
    h.supervisor.start_or_replace(config).await.unwrap();

    let sink = Arc::clone(&h.sink);
    assert!(
        wait_until(Duration::from_secs(5), || sink.alert_count() >= 1).await,
        "BBB must alert even though AAA fails every cycle"
    );

    let alerts = h.sink.alerts();
    assert_eq!(alerts[0].1.symbol, "BBB");

    // AAA never produced an observation; BBB has both cycles persisted.
    assert!(h.table.get("s1", "AAA").is_none());
    let since = chrono::Utc::now() - chrono::Duration::hours(1);
    assert_eq!(h.store.history_since("BBB", since).await.unwrap().len(), 2);
    assert!(h.store.history_since("AAA", since).await.unwrap().is_empty());

    h.supervisor.shutdown_all().await;
}

#[tokio::test]
async fn test_shared_baseline_crosses_subscribers() {
    // s1 seeds BBB at 50 and keeps re-observing 50; s2's very first
    // observation of 55 is then a 10% move against s1's baseline.
    let h = harness(ScriptedSource::new().with_values("BBB", &[50.0; 30]));
    let s1 = subscriber("s1", &["BBB"], 99.0);
    h.store.upsert_subscriber(s1.clone()).await.unwrap();
    h.supervisor.start_or_replace(s1).await.unwrap();

    let table = Arc::clone(&h.table);
    assert!(
        wait_until(Duration::from_secs(3), || table.get("s2", "BBB").is_some()).await,
        "s1's observation must be visible under the shared key"
    );

    // Freeze s1 so the baseline stays at 50 for s2's first comparison.
    h.supervisor.stop("s1").await;
    assert_eq!(h.table.get("s2", "BBB").map(|(v, _)| v), Some(50.0));

    // s2 runs against the same store, sink, and table, but its own source
    // script serves 55 on the first fetch.
    let s2_source = ScriptedSource::new().with_values("BBB", &[55.0]);
    let ctx = MonitorContext {
        source: Arc::new(s2_source),
        store: Arc::clone(&h.store) as Arc<dyn Store>,
        sink: Arc::clone(&h.sink) as Arc<dyn NotificationSink>,
        table: Arc::clone(&h.table),
    };
    let supervisor2 = MonitorSupervisor::new(ctx);
    let s2 = subscriber("s2", &["BBB"], 10.0);
    h.store.upsert_subscriber(s2.clone()).await.unwrap();
    supervisor2.start_or_replace(s2).await.unwrap();

    let sink = Arc::clone(&h.sink);
    assert!(
        wait_until(Duration::from_secs(5), || sink.alert_count() >= 1).await,
        "s2's first observation must fire against s1's baseline"
    );

    let alerts = h.sink.alerts();
    let (subscriber_id, decision) = &alerts[0];
    assert_eq!(subscriber_id, "s2");
    assert_eq!(decision.previous_value, Some(50.0));
    assert_eq!(decision.current_value, 55.0);
    assert!((decision.change_percent - 10.0).abs() < 1e-9);

    supervisor2.shutdown_all().await;
    h.supervisor.shutdown_all().await;
}

#[tokio::test]
async fn test_start_or_replace_leaves_one_monitor() {
    let h = harness(ScriptedSource::new().with_values("AAA", &[100.0; 30]));
    let config = subscriber("s1", &["AAA"], 5.0);
    h.store.upsert_subscriber(config.clone()).await.unwrap();

    h.supervisor.start_or_replace(config.clone()).await.unwrap();
    h.supervisor.start_or_replace(config).await.unwrap();

    assert_eq!(h.supervisor.active_count().await, 1);
    assert!(h.supervisor.is_running("s1").await);

    h.supervisor.shutdown_all().await;
    assert_eq!(h.supervisor.active_count().await, 0);
}

#[tokio::test]
async fn test_no_alerts_after_stop() {
    // Alternating 100/200 fires on every comparison while running.
    let h = harness(ScriptedSource::new().with_values(
        "AAA",
        &[100.0, 200.0, 100.0, 200.0, 100.0, 200.0, 100.0, 200.0],
    ));
    let config = subscriber("s1", &["AAA"], 5.0);
    h.store.upsert_subscriber(config.clone()).await.unwrap();
    h.supervisor.start_or_replace(config).await.unwrap();

    let sink = Arc::clone(&h.sink);
    assert!(wait_until(Duration::from_secs(5), || sink.alert_count() >= 1).await);

    assert!(h.supervisor.stop("s1").await);
    let after_stop = h.sink.alert_count();

    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(
        h.sink.alert_count(),
        after_stop,
        "a stopped monitor must produce no further side effects"
    );
}

#[tokio::test]
async fn test_unsubscribe_ends_monitor_cleanly() {
    let h = harness(ScriptedSource::new().with_values("AAA", &[100.0; 30]));
    let config = subscriber("s1", &["AAA"], 5.0);
    h.store.upsert_subscriber(config.clone()).await.unwrap();
    h.supervisor.start_or_replace(config).await.unwrap();
    assert!(h.supervisor.is_running("s1").await);

    h.store.remove_subscriber("s1").await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let mut exited = false;
    while tokio::time::Instant::now() < deadline {
        if !h.supervisor.is_running("s1").await {
            exited = true;
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }
    assert!(exited, "monitor must exit once its subscriber record disappears");
}

#[tokio::test]
async fn test_bootstrap_skips_invalid_record() {
    let h = harness(ScriptedSource::new().with_values("AAA", &[100.0; 30]));
    h.store
        .upsert_subscriber(subscriber("good", &["AAA"], 5.0))
        .await
        .unwrap();
    // Stored record with an empty symbol set fails validation at start.
    h.store
        .upsert_subscriber(subscriber("bad", &[], 5.0))
        .await
        .unwrap();

    let started = h.supervisor.bootstrap_all().await.unwrap();
    assert_eq!(started, 1, "one bad record must not abort bootstrap");
    assert!(h.supervisor.is_running("good").await);
    assert!(!h.supervisor.is_running("bad").await);

    h.supervisor.shutdown_all().await;
}
