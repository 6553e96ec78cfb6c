//! Durable storage seam
//!
//! Owns subscriber configuration and the per-symbol price history. The
//! monitoring core reads subscriber records at bootstrap and at each cycle
//! start, and appends one history record per successful observation;
//! subscriber mutations come only from the front end, never from a monitor.

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::SubscriberConfig;
use crate::core::types::Observation;

/// Store-layer error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced subscriber does not exist
    #[error("Subscriber not found: {0}")]
    NotFound(String),

    /// Backing file could not be read or written
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable storage for subscriber configuration and price history
///
/// Implementations must be safe for concurrent calls from all subscriber
/// tasks; no ordering is guaranteed between interleaved calls.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a subscriber record, replacing any existing one with the same id
    async fn upsert_subscriber(&self, config: SubscriberConfig) -> StoreResult<()>;

    /// Delete a subscriber record; `NotFound` when absent
    async fn remove_subscriber(&self, id: &str) -> StoreResult<()>;

    /// Load one subscriber record, `None` when absent
    async fn load_subscriber(&self, id: &str) -> StoreResult<Option<SubscriberConfig>>;

    /// Load the full subscriber roster
    async fn load_all_subscribers(&self) -> StoreResult<Vec<SubscriberConfig>>;

    /// Append one observation to the symbol's history
    async fn append_history(&self, observation: &Observation) -> StoreResult<()>;

    /// History records for a symbol since a point in time, ascending by timestamp
    async fn history_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Observation>>;
}
