//! Notification seam
//!
//! Delivery of a fired decision to a subscriber is fire-and-forget from
//! the monitor's point of view: a sink that fails to deliver logs the
//! failure itself and never surfaces it back into the monitoring loop.

use async_trait::async_trait;
use tracing::info;

use crate::core::types::AnomalyDecision;

/// Destination for anomaly alerts
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one fired decision to a subscriber
    async fn alert(&self, subscriber_id: &str, decision: &AnomalyDecision);
}

/// Sink that writes alerts to the structured log
///
/// Stand-in for a chat transport; keeps the original alert line shape
/// (`SYMBOL: prev -> current (change%)`).
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }

    fn render(decision: &AnomalyDecision) -> String {
        format!(
            "Anomaly! {}: {:.2} -> {:.2} (change: {:.2}%)",
            decision.symbol,
            decision.previous_value.unwrap_or_default(),
            decision.current_value,
            decision.change_percent
        )
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn alert(&self, subscriber_id: &str, decision: &AnomalyDecision) {
        info!(
            event_type = "ALERT_DELIVERED",
            subscriber = %subscriber_id,
            symbol = %decision.symbol,
            "{}",
            Self::render(decision)
        );
    }
}
