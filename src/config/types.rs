//! Configuration types for subscriber monitoring settings
//!
//! Subscriber records are loaded from YAML at startup and owned by the
//! store afterwards; the monitor only ever reads them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Monitoring settings for one subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberConfig {
    /// Opaque subscriber identity (e.g. a chat id)
    pub id: String,
    /// Opaque credential passed through to the quote source
    pub credential: String,
    /// Watched symbols, case-normalized
    pub symbols: Vec<String>,
    /// Seconds between polling cycles
    pub interval_secs: u64,
    /// Anomaly threshold in percent (e.g. 5.0 = alert at a 5% move)
    pub threshold_percent: f64,
}

impl SubscriberConfig {
    /// Polling interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Upper-case symbols and drop duplicates, preserving order
    pub fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        let mut normalized = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let upper = symbol.trim().to_uppercase();
            if !upper.is_empty() && seen.insert(upper.clone()) {
                normalized.push(upper);
            }
        }
        self.symbols = normalized;
    }

    /// Validate subscriber configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::Config("Subscriber id cannot be empty".to_string()));
        }

        if self.credential.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Subscriber '{}': credential cannot be empty",
                self.id
            )));
        }

        if self.symbols.is_empty() {
            return Err(AppError::Config(format!(
                "Subscriber '{}': watched symbol set cannot be empty",
                self.id
            )));
        }

        for symbol in &self.symbols {
            if symbol.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Subscriber '{}': symbols cannot be blank",
                    self.id
                )));
            }
        }

        if self.interval_secs == 0 {
            return Err(AppError::Config(format!(
                "Subscriber '{}': interval_secs must be positive",
                self.id
            )));
        }

        if !self.threshold_percent.is_finite() || self.threshold_percent <= 0.0 {
            return Err(AppError::Config(format!(
                "Subscriber '{}': threshold_percent must be a positive finite number (got {})",
                self.id, self.threshold_percent
            )));
        }

        Ok(())
    }
}

/// Root configuration file: the full subscriber roster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    pub subscribers: Vec<SubscriberConfig>,
}

impl WatchConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        if self.subscribers.is_empty() {
            return Err(AppError::Config(
                "Configuration must contain at least one subscriber".to_string(),
            ));
        }

        let mut seen_ids = std::collections::HashSet::new();
        for subscriber in &self.subscribers {
            if !seen_ids.insert(&subscriber.id) {
                return Err(AppError::Config(format!(
                    "Duplicate subscriber id: '{}'",
                    subscriber.id
                )));
            }
        }

        for subscriber in &self.subscribers {
            subscriber.validate()?;
        }

        Ok(())
    }
}
