//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a collection store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the operation (permissions, quota, bad payload).
    #[error("store rejected the request: {0}")]
    Rejected(String),

    /// The notification channel of a subscription closed.
    #[error("subscription closed")]
    SubscriptionClosed,

    /// The payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<tooldir_model::ModelError> for StoreError {
    fn from(err: tooldir_model::ModelError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
