//! Error types for the mirror.

use thiserror::Error;
use tooldir_store::StoreError;

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors that can occur while mirroring the collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    /// `attach` was called while a subscription is active.
    #[error("mirror already attached")]
    AlreadyAttached,

    /// The mirror holds no subscription.
    #[error("mirror not attached")]
    NotAttached,

    /// The store refused the subscription.
    #[error("subscription failed: {0}")]
    Subscription(#[from] StoreError),

    /// The subscription broke after it was established.
    #[error("mirror failed: {0}")]
    Failed(String),
}
