//! Quote source error types
//!
//! A fetch either succeeds or fails for the cycle; the monitor never retries
//! a single fetch, so these errors stay per-symbol and per-cycle.

use thiserror::Error;

/// Failure modes of a single quote fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The symbol is unknown to the quote source
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The source could not serve the request right now
    #[error("Quote source unavailable: {0}")]
    TransientUnavailable(String),

    /// The subscriber's credential was rejected
    #[error("Invalid credential")]
    InvalidCredential,
}

/// Result type alias for quote source operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_not_found_display() {
        let err = FetchError::SymbolNotFound("SBER".to_string());
        assert_eq!(err.to_string(), "Symbol not found: SBER");
    }

    #[test]
    fn test_transient_unavailable_display() {
        let err = FetchError::TransientUnavailable("connection reset".to_string());
        assert_eq!(err.to_string(), "Quote source unavailable: connection reset");
    }

    #[test]
    fn test_invalid_credential_display() {
        assert_eq!(FetchError::InvalidCredential.to_string(), "Invalid credential");
    }
}
