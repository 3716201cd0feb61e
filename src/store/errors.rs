//! Store errors
//!
//! Every variant is propagated verbatim to the caller; the core never
//! retries a store call on its own.

use thiserror::Error;

use crate::observability::Severity;

/// Result type for store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a `HashStore`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store could not be reached or refused the call
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Call deadline passed
    #[error("store call timed out")]
    Timeout,

    /// Caller cancelled the call
    #[error("store call cancelled")]
    Cancelled,
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "HX_STORE_UNAVAILABLE",
            StoreError::Timeout => "HX_STORE_TIMEOUT",
            StoreError::Cancelled => "HX_STORE_CANCELLED",
        }
    }

    /// Cancellation is the caller's own doing and only worth a warning
    pub fn severity(&self) -> Severity {
        match self {
            StoreError::Cancelled => Severity::Warn,
            StoreError::Unavailable(_) | StoreError::Timeout => Severity::Error,
        }
    }
}
