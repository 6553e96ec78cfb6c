//! Per-subscriber monitoring task
//!
//! One long-lived task per subscriber: each cycle re-snapshots the
//! subscriber's config from the store, fans out one concurrent check per
//! watched symbol, folds successes into the shared baseline table, alerts
//! on fired decisions, then sleeps for the subscriber's interval. The task
//! ends cleanly when its shutdown channel fires or the subscriber record
//! disappears; unexpected cycle errors back off and retry rather than
//! killing the task.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::SubscriberConfig;
use crate::core::baseline::LastObservationTable;
use crate::core::events::{log_anomaly, log_system_event, SystemEvent};
use crate::error::AppError;
use crate::notify::NotificationSink;
use crate::source::QuoteSource;
use crate::store::Store;

/// First retry delay after a failed cycle
const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Retry delay cap
const MAX_BACKOFF_MS: u64 = 60_000;

/// Shared collaborators handed to every monitor task
#[derive(Clone)]
pub struct MonitorContext {
    pub source: Arc<dyn QuoteSource>,
    pub store: Arc<dyn Store>,
    pub sink: Arc<dyn NotificationSink>,
    pub table: Arc<LastObservationTable>,
}

/// How one cycle ended
enum CycleOutcome {
    /// All symbols processed (some may have failed individually); sleep
    /// for the snapshotted interval before the next cycle
    Completed { interval: Duration },
    /// Subscriber record no longer exists; terminate the loop cleanly
    Unsubscribed,
}

/// Monitor loop for one subscriber
///
/// Cancellation is observed at the top of each cycle and during the
/// inter-cycle sleep; once observed, no further store or sink calls are
/// made.
pub async fn monitor_task(
    ctx: MonitorContext,
    subscriber_id: String,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    log_system_event(&SystemEvent::task_started(&subscriber_id));

    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        // Shutdown wins over an in-flight cycle: both the fetch fan-out and
        // the store calls are cancellable suspension points.
        let outcome = tokio::select! {
            _ = shutdown_rx.recv() => {
                log_system_event(&SystemEvent::task_shutdown(&subscriber_id, "shutdown_signal"));
                break;
            }
            outcome = run_cycle(&ctx, &subscriber_id) => outcome,
        };

        let sleep_for = match outcome {
            Ok(CycleOutcome::Completed { interval }) => {
                backoff_ms = INITIAL_BACKOFF_MS;
                interval
            }
            Ok(CycleOutcome::Unsubscribed) => {
                log_system_event(&SystemEvent::task_shutdown(&subscriber_id, "unsubscribed"));
                break;
            }
            Err(e) => {
                // A broken cycle self-heals: log, back off, try again.
                error!(
                    subscriber = %subscriber_id,
                    error = %e,
                    retry_in_ms = backoff_ms,
                    "Monitoring cycle failed, retrying after backoff"
                );
                let delay = Duration::from_millis(backoff_ms);
                backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                delay
            }
        };

        tokio::select! {
            _ = shutdown_rx.recv() => {
                log_system_event(&SystemEvent::task_shutdown(&subscriber_id, "shutdown_signal"));
                break;
            }
            _ = sleep(sleep_for) => {}
        }
    }

    log_system_event(&SystemEvent::task_stopped(&subscriber_id));
}

/// Run one polling cycle: snapshot config, fan out per-symbol checks, join.
async fn run_cycle(ctx: &MonitorContext, subscriber_id: &str) -> Result<CycleOutcome, AppError> {
    let Some(config) = ctx.store.load_subscriber(subscriber_id).await? else {
        return Ok(CycleOutcome::Unsubscribed);
    };

    // The symbol snapshot is this cycle's working set; a roster update
    // written to the store takes effect on the next cycle.
    let checks = config
        .symbols
        .iter()
        .map(|symbol| check_symbol(ctx, &config, symbol));
    let results = join_all(checks).await;

    let failed = results.iter().filter(|ok| !**ok).count();
    debug!(
        subscriber = %subscriber_id,
        symbols = results.len(),
        failed = failed,
        "Cycle complete"
    );

    Ok(CycleOutcome::Completed {
        interval: config.interval(),
    })
}

/// Check a single symbol; returns false when the check was skipped.
///
/// Failure of one symbol is never fatal: siblings in the same cycle and
/// the subscriber's next cycle proceed regardless.
async fn check_symbol(ctx: &MonitorContext, config: &SubscriberConfig, symbol: &str) -> bool {
    let observation = match ctx.source.fetch(&config.credential, symbol).await {
        Ok(obs) => obs,
        Err(e) => {
            warn!(
                subscriber = %config.id,
                symbol = %symbol,
                error = %e,
                "Fetch failed, skipping symbol this cycle"
            );
            return false;
        }
    };

    if let Err(e) = ctx.store.append_history(&observation).await {
        // History is best-effort per symbol; the detection still runs.
        warn!(
            subscriber = %config.id,
            symbol = %symbol,
            error = %e,
            "History append failed"
        );
    }

    let decision = ctx
        .table
        .observe(&config.id, &observation, config.threshold_percent);
    if decision.fired {
        log_anomaly(&config.id, &decision);
        ctx.sink.alert(&config.id, &decision).await;
    }

    true
}
