//! Quote source trait definition
//!
//! The QuoteSource trait is the seam between the monitoring core and
//! whatever market-data backend supplies current values. The core treats
//! each fetch as a single attempt: success yields an observation, failure
//! skips the symbol for that cycle.

use async_trait::async_trait;

use crate::core::types::Observation;
use crate::source::errors::FetchResult;

/// Common trait for quote backends
///
/// Implementations must be safe for concurrent calls: every subscriber
/// task fans out one fetch per watched symbol, and tasks interleave
/// arbitrarily.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current value for a symbol on behalf of a subscriber
    ///
    /// # Arguments
    /// * `credential` - Opaque subscriber token for the backend
    /// * `symbol` - Case-normalized symbol (e.g. "SBER")
    ///
    /// # Returns
    /// An observation stamped with the fetch time, or a `FetchError`
    /// describing why this attempt failed.
    async fn fetch(&self, credential: &str, symbol: &str) -> FetchResult<Observation>;
}
