//! In-memory store
//!
//! Default backing store for tests and single-process runs. State lives in
//! a mutex-guarded map and vanishes with the process.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::SubscriberConfig;
use crate::core::types::Observation;
use crate::store::{Store, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    subscribers: HashMap<String, SubscriberConfig>,
    history: Vec<Observation>,
}

/// Mutex-guarded in-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of history records (all symbols)
    pub fn history_len(&self) -> usize {
        self.inner.lock().unwrap().history.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_subscriber(&self, config: SubscriberConfig) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.insert(config.id.clone(), config);
        Ok(())
    }

    async fn remove_subscriber(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .subscribers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn load_subscriber(&self, id: &str) -> StoreResult<Option<SubscriberConfig>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.subscribers.get(id).cloned())
    }

    async fn load_all_subscribers(&self) -> StoreResult<Vec<SubscriberConfig>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.subscribers.values().cloned().collect())
    }

    async fn append_history(&self, observation: &Observation) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.history.push(observation.clone());
        Ok(())
    }

    async fn history_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Observation>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<Observation> = inner
            .history
            .iter()
            .filter(|o| o.symbol == symbol && o.timestamp >= since)
            .cloned()
            .collect();
        records.sort_by_key(|o| o.timestamp);
        Ok(records)
    }
}
