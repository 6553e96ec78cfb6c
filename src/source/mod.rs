//! Quote source seam — trait, errors, and the simulated backend

pub mod errors;
pub mod sim;
pub mod traits;

pub use errors::{FetchError, FetchResult};
pub use sim::SimulatedSource;
pub use traits::QuoteSource;
