//! Monitor supervisor
//!
//! Registry of all active per-subscriber monitor tasks, keyed by
//! subscriber id. Owns the start/replace/stop lifecycle and the
//! monitor-everyone bootstrap at process start. Replacing a monitor is
//! cancel-then-await-then-spawn: the old task has fully terminated before
//! the new one exists, so two monitors for one subscriber never run
//! concurrently.

use std::collections::HashMap;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::error;

use crate::config::SubscriberConfig;
use crate::core::events::{log_system_event, SystemEvent};
use crate::core::monitor::{monitor_task, MonitorContext};
use crate::error::Result;

/// Cancellation control for one running monitor task
struct MonitorHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signal shutdown and wait for the task to terminate
    async fn stop(self) {
        // The task may already have exited on its own (unsubscribed);
        // a send error just means there is no receiver left.
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            if e.is_panic() {
                error!(error = %e, "Monitor task panicked during shutdown");
            }
        }
    }
}

/// Registry of active monitors plus the collaborators they share
pub struct MonitorSupervisor {
    ctx: MonitorContext,
    monitors: Mutex<HashMap<String, MonitorHandle>>,
}

impl MonitorSupervisor {
    pub fn new(ctx: MonitorContext) -> Self {
        Self {
            ctx,
            monitors: Mutex::new(HashMap::new()),
        }
    }

    /// Start a monitor for a subscriber, replacing any existing one
    ///
    /// Idempotent: a running monitor for the same id is cancelled and
    /// awaited to completion before the new task spawns, which serializes
    /// configuration changes per subscriber. The config itself is read
    /// back from the store at every cycle start; the argument is used for
    /// validation and identity.
    pub async fn start_or_replace(&self, config: SubscriberConfig) -> Result<()> {
        config.validate()?;

        let mut monitors = self.monitors.lock().await;
        if let Some(existing) = monitors.remove(&config.id) {
            existing.stop().await;
        }

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(monitor_task(
            self.ctx.clone(),
            config.id.clone(),
            shutdown_rx,
        ));
        monitors.insert(config.id, MonitorHandle { shutdown_tx, task });
        Ok(())
    }

    /// Start monitors for every subscriber known to the store
    ///
    /// One bad record is logged and skipped; it never aborts bootstrap of
    /// the rest. Returns the number of monitors started.
    pub async fn bootstrap_all(&self) -> Result<usize> {
        let subscribers = self.ctx.store.load_all_subscribers().await?;
        let mut started = 0;
        for config in subscribers {
            let id = config.id.clone();
            match self.start_or_replace(config).await {
                Ok(()) => started += 1,
                Err(e) => {
                    log_system_event(&SystemEvent::bootstrap_skipped(&id, &e.to_string()));
                }
            }
        }
        Ok(started)
    }

    /// Cancel and await a subscriber's monitor; returns false when absent
    pub async fn stop(&self, subscriber_id: &str) -> bool {
        let handle = {
            let mut monitors = self.monitors.lock().await;
            monitors.remove(subscriber_id)
        };
        match handle {
            Some(handle) => {
                handle.stop().await;
                true
            }
            None => false,
        }
    }

    /// Stop every registered monitor; used at process shutdown
    pub async fn shutdown_all(&self) {
        let handles: Vec<MonitorHandle> = {
            let mut monitors = self.monitors.lock().await;
            monitors.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            handle.stop().await;
        }
    }

    /// Whether a live monitor exists for this id
    ///
    /// A monitor that exited on its own (unsubscribed) is pruned from the
    /// registry here rather than lingering as a finished handle.
    pub async fn is_running(&self, subscriber_id: &str) -> bool {
        let mut monitors = self.monitors.lock().await;
        match monitors.get(subscriber_id) {
            Some(h) if h.task.is_finished() => {
                monitors.remove(subscriber_id);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Number of live monitors; finished handles are pruned first
    pub async fn active_count(&self) -> usize {
        let mut monitors = self.monitors.lock().await;
        monitors.retain(|_, h| !h.task.is_finished());
        monitors.len()
    }
}
