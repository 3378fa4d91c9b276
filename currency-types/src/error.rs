//! Error types for the rate client.

use crate::domain::CurrencyCode;

/// Failures of the rate synchronisation core.
///
/// During a sync cycle every variant is caught, logged and degraded to the
/// last known state; none of them is fatal to the controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("Invalid timestamp: {0}")]
    Parse(String),

    #[error("Storage read failed: {0}")]
    StorageRead(String),

    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    /// Carries the code that had no record; the message is the one shown in a slot.
    #[error("Currency not found")]
    Lookup(CurrencyCode),
}

/// Result type for rate operations.
pub type RateResult<T> = Result<T, RateError>;
