//! File-backed store
//!
//! Persists the subscriber roster and price history as one JSON snapshot
//! file. The snapshot is loaded at construction and rewritten after every
//! mutation, so a restarted process re-derives its full state from here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::SubscriberConfig;
use crate::core::types::Observation;
use crate::store::{Store, StoreError, StoreResult};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    subscribers: HashMap<String, SubscriberConfig>,
    history: Vec<Observation>,
}

/// JSON snapshot store
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    snapshot: Mutex<Snapshot>,
}

impl JsonStore {
    /// Open a store at `path`, loading the existing snapshot if present
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Snapshot::default()
        };
        Ok(Self {
            path,
            snapshot: Mutex::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot to disk; called with the lock held so concurrent
    /// mutations serialize their file writes. The blocking write runs on
    /// the blocking pool, off the async workers.
    async fn persist(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let encoded = serde_json::to_string_pretty(snapshot)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || std::fs::write(&path, encoded))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;
        Ok(())
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn upsert_subscriber(&self, config: SubscriberConfig) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock().await;
        snapshot.subscribers.insert(config.id.clone(), config);
        self.persist(&snapshot).await
    }

    async fn remove_subscriber(&self, id: &str) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.subscribers.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist(&snapshot).await
    }

    async fn load_subscriber(&self, id: &str) -> StoreResult<Option<SubscriberConfig>> {
        let snapshot = self.snapshot.lock().await;
        Ok(snapshot.subscribers.get(id).cloned())
    }

    async fn load_all_subscribers(&self) -> StoreResult<Vec<SubscriberConfig>> {
        let snapshot = self.snapshot.lock().await;
        Ok(snapshot.subscribers.values().cloned().collect())
    }

    async fn append_history(&self, observation: &Observation) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock().await;
        snapshot.history.push(observation.clone());
        self.persist(&snapshot).await
    }

    async fn history_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Observation>> {
        let snapshot = self.snapshot.lock().await;
        let mut records: Vec<Observation> = snapshot
            .history
            .iter()
            .filter(|o| o.symbol == symbol && o.timestamp >= since)
            .cloned()
            .collect();
        records.sort_by_key(|o| o.timestamp);
        Ok(records)
    }
}
