//! Application-wide error types using thiserror
//!
//! Layer-specific errors (`FetchError`, `StoreError`) convert into `AppError`
//! so callers above the collaborator seams handle a single error type.

use thiserror::Error;

use crate::source::FetchError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Quote source error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
