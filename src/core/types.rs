//! Core data types for the monitoring and anomaly detection pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single sampled value for a symbol
///
/// Produced by a `QuoteSource`, persisted as a history record, and folded
/// into the shared baseline table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Case-normalized symbol (e.g. "SBER")
    pub symbol: String,
    /// Observed value
    pub value: f64,
    /// When the value was observed
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// Observation stamped with the current time
    pub fn now(symbol: &str, value: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            value,
            timestamp: Utc::now(),
        }
    }

    /// Observation with an explicit timestamp
    pub fn at(symbol: &str, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            value,
            timestamp,
        }
    }
}

/// Outcome of evaluating one observation against the stored baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyDecision {
    /// Whether the change met or exceeded the subscriber's threshold
    pub fired: bool,
    /// Symbol the decision applies to
    pub symbol: String,
    /// Absolute cycle-over-cycle change in percent (0.0 when seeding)
    pub change_percent: f64,
    /// Baseline value the observation was compared against (None when seeding)
    pub previous_value: Option<f64>,
    /// The observed value
    pub current_value: f64,
    /// Timestamp of the observation
    pub timestamp: DateTime<Utc>,
}

/// Get current time in milliseconds since epoch
#[inline]
pub fn current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
