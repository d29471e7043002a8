//! Core type definitions for Tooldir.
//!
//! This crate defines the small, collaborator-agnostic types shared by every
//! other crate in the workspace:
//! - Opaque identifiers for entries, identities and subscriptions
//! - Server-assigned creation timestamps
//!
//! Domain records (entries, sessions, criteria) live in their own crates.

mod ids;
mod timestamp;

pub use ids::{EntryId, IdentityId, SubscriptionId};
pub use timestamp::ServerTimestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
