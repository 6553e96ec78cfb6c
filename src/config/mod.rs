//! Configuration loading and validation

pub mod logging;
pub mod types;

pub use types::{SubscriberConfig, WatchConfig};

use std::path::Path;

use crate::error::AppError;

/// Load, normalize, and validate a subscriber roster from a YAML file
pub fn load_config(path: &Path) -> Result<WatchConfig, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let mut config: WatchConfig = serde_yaml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    for subscriber in &mut config.subscribers {
        subscriber.normalize();
    }
    config.validate()?;
    Ok(config)
}
