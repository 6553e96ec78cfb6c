//! Core module - baseline table, anomaly detection, monitor tasks, supervisor
//!
//! Uses explicit re-exports instead of glob exports to keep the public
//! API surface visible in one place.

pub mod baseline;
pub mod detector;
pub mod events;
pub mod monitor;
pub mod supervisor;
pub mod types;

pub use baseline::{BaselineKeying, LastObservationTable};
pub use monitor::{monitor_task, MonitorContext};
pub use supervisor::MonitorSupervisor;
pub use types::{current_time_ms, AnomalyDecision, Observation};
