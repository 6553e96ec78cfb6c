//! Shared last-observation table
//!
//! Concurrency-safe mapping from a baseline key to the most recently
//! observed value and timestamp. Every subscriber task folds its successful
//! observations in here, and the table supplies the "previous value" for
//! the next anomaly comparison.
//!
//! By default entries are keyed by **symbol alone**, shared across all
//! subscribers: one subscriber's poll cadence can supply the baseline used
//! in another subscriber's comparison. That sharing is deliberate and kept
//! behind the `BaselineKeying` policy so it can be swapped for
//! per-subscriber keying without touching the evaluator.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::core::detector;
use crate::core::types::{AnomalyDecision, Observation};

/// How baseline entries are keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselineKeying {
    /// One entry per symbol, shared across subscribers (default)
    #[default]
    SharedBySymbol,
    /// One entry per (subscriber, symbol) pair
    PerSubscriber,
}

impl BaselineKeying {
    fn key(&self, subscriber_id: &str, symbol: &str) -> String {
        match self {
            BaselineKeying::SharedBySymbol => symbol.to_string(),
            BaselineKeying::PerSubscriber => format!("{}\u{1f}{}", subscriber_id, symbol),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BaselineEntry {
    value: f64,
    timestamp: DateTime<Utc>,
}

/// Concurrency-safe last-observed-value table
///
/// A single coarse mutex guards the whole map: symbol counts are small,
/// the lock is never held across an await point, and the combined
/// read-evaluate-write in [`observe`](Self::observe) must be one critical
/// section anyway to rule out lost updates between two subscribers
/// watching the same symbol. Value and timestamp live in one entry, so a
/// concurrent read never sees a torn pair. Entries are never deleted in
/// normal operation.
#[derive(Debug, Default)]
pub struct LastObservationTable {
    keying: BaselineKeying,
    entries: Mutex<HashMap<String, BaselineEntry>>,
}

impl LastObservationTable {
    /// Table with the default shared-by-symbol keying
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with an explicit keying policy
    pub fn with_keying(keying: BaselineKeying) -> Self {
        Self {
            keying,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Read the baseline for a subscriber's symbol, if one exists
    pub fn get(&self, subscriber_id: &str, symbol: &str) -> Option<(f64, DateTime<Utc>)> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(&self.keying.key(subscriber_id, symbol))
            .map(|e| (e.value, e.timestamp))
    }

    /// Overwrite the baseline for a subscriber's symbol
    pub fn set(&self, subscriber_id: &str, symbol: &str, value: f64, timestamp: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            self.keying.key(subscriber_id, symbol),
            BaselineEntry { value, timestamp },
        );
    }

    /// Evaluate an observation against the baseline and advance it
    ///
    /// Read-previous, evaluate, write-new happens under one lock so two
    /// subscribers observing the same symbol concurrently can never both
    /// compare against the same stale baseline. The baseline advances to
    /// the new observation whether or not the decision fired.
    pub fn observe(
        &self,
        subscriber_id: &str,
        observation: &Observation,
        threshold_percent: f64,
    ) -> AnomalyDecision {
        let key = self.keying.key(subscriber_id, &observation.symbol);
        let mut entries = self.entries.lock().unwrap();
        let previous = entries.get(&key).map(|e| e.value);
        let decision = detector::evaluate(previous, observation, threshold_percent);
        entries.insert(
            key,
            BaselineEntry {
                value: observation.value,
                timestamp: observation.timestamp,
            },
        );
        decision
    }

    /// Number of tracked baselines
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
