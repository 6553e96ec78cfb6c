//! Structured event helpers for monitoring lifecycle and detections
//!
//! All task lifecycle and detection logs go through these factory
//! constructors and logging functions so field names and levels stay
//! consistent across the codebase.

use tracing::{debug, info, warn};

use crate::core::types::{current_time_ms, AnomalyDecision};

/// Format a percentage value with 2 decimal places
#[inline]
pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}

/// System event types for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventType {
    /// Monitor task started (DEBUG)
    TaskStarted,
    /// Monitor task stopped cleanly (INFO)
    TaskStopped,
    /// Monitor task shutting down with reason (INFO)
    TaskShutdown,
    /// Bootstrap skipped a bad subscriber record (WARN)
    BootstrapSkipped,
}

/// System lifecycle event
pub struct SystemEvent {
    pub event_type: SystemEventType,
    /// Unix epoch milliseconds at construction
    pub timestamp_ms: u64,
    pub subscriber: String,
    pub message: String,
    pub details: Option<String>,
}

impl SystemEvent {
    /// Monitor task started (DEBUG level)
    pub fn task_started(subscriber: &str) -> Self {
        Self {
            event_type: SystemEventType::TaskStarted,
            timestamp_ms: current_time_ms(),
            subscriber: subscriber.to_string(),
            message: format!("monitor task started for {}", subscriber),
            details: None,
        }
    }

    /// Monitor task stopped cleanly (INFO level)
    pub fn task_stopped(subscriber: &str) -> Self {
        Self {
            event_type: SystemEventType::TaskStopped,
            timestamp_ms: current_time_ms(),
            subscriber: subscriber.to_string(),
            message: format!("monitor task stopped for {}", subscriber),
            details: None,
        }
    }

    /// Monitor task shutting down with reason (INFO level)
    pub fn task_shutdown(subscriber: &str, reason: &str) -> Self {
        Self {
            event_type: SystemEventType::TaskShutdown,
            timestamp_ms: current_time_ms(),
            subscriber: subscriber.to_string(),
            message: format!("monitor for {} shutting down", subscriber),
            details: Some(reason.to_string()),
        }
    }

    /// Bootstrap skipped one subscriber record (WARN level)
    pub fn bootstrap_skipped(subscriber: &str, reason: &str) -> Self {
        Self {
            event_type: SystemEventType::BootstrapSkipped,
            timestamp_ms: current_time_ms(),
            subscriber: subscriber.to_string(),
            message: format!("skipping subscriber {} during bootstrap", subscriber),
            details: Some(reason.to_string()),
        }
    }
}

/// Log a system event with its mapped level
///
/// Level mapping:
/// - TaskStopped, TaskShutdown → INFO
/// - BootstrapSkipped → WARN
/// - TaskStarted → DEBUG
pub fn log_system_event(event: &SystemEvent) {
    let event_type_str = format!("{:?}", event.event_type).to_uppercase();

    match event.event_type {
        SystemEventType::TaskStopped | SystemEventType::TaskShutdown => {
            info!(
                event_type = %event_type_str,
                timestamp_ms = event.timestamp_ms,
                subscriber = %event.subscriber,
                details = ?event.details,
                "{}", event.message
            );
        }
        SystemEventType::BootstrapSkipped => {
            warn!(
                event_type = %event_type_str,
                timestamp_ms = event.timestamp_ms,
                subscriber = %event.subscriber,
                details = ?event.details,
                "{}", event.message
            );
        }
        SystemEventType::TaskStarted => {
            debug!(
                event_type = %event_type_str,
                timestamp_ms = event.timestamp_ms,
                subscriber = %event.subscriber,
                "{}", event.message
            );
        }
    }
}

/// Log a fired detection (INFO level, structured fields)
pub fn log_anomaly(subscriber: &str, decision: &AnomalyDecision) {
    info!(
        event_type = "ANOMALY_DETECTED",
        subscriber = %subscriber,
        symbol = %decision.symbol,
        change = %format_pct(decision.change_percent),
        previous = ?decision.previous_value,
        current = decision.current_value,
        "Anomaly detected"
    );
}
