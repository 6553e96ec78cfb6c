//! quotewatch — per-subscriber quote anomaly monitoring
//!
//! Watches a changing set of symbols on behalf of independent subscribers:
//! - One cancellable tokio task per subscriber, polling on its own interval
//! - Per-symbol fan-out inside each cycle with failure isolation
//! - Shared last-observation baseline for cycle-over-cycle change detection
//! - Alerts delivered through a pluggable notification sink

pub mod config;
pub mod core;
pub mod error;
pub mod notify;
pub mod source;
pub mod store;

pub use error::{AppError, Result};
