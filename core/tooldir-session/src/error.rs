//! Error types for the session layer.

use thiserror::Error;

/// Result type for identity provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Failures reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider refused the request.
    #[error("identity request rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider accepted the request but never reported the new identity.
    #[error("timed out waiting for the identity provider")]
    Timeout,
}

/// Errors surfaced by the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A gated action was attempted without an identity.
    #[error("an identity is required; continue as guest or sign in first")]
    SessionRequired,

    /// The identity provider failed. Safe to retry.
    #[error("identity provider error: {0}")]
    IdentityProvider(#[from] ProviderError),

    /// `init` was called on a running manager.
    #[error("session manager already initialized")]
    AlreadyInitialized,

    /// The manager is not listening to the provider.
    #[error("session manager not initialized")]
    NotInitialized,
}
