//! Directory entry model for Tooldir.
//!
//! Defines the records every other subsystem speaks:
//! - [`Entry`] — one listed tool, decoded leniently from a store [`Document`]
//! - [`TagSet`] — ordered, duplicate-free tag list
//! - [`Pricing`] — the closed pricing domain
//! - [`NewEntry`] — the write payload handed to the store on submission
//! - [`catalog`] — the fixed category and suggested-tag lists offered to submitters

pub mod catalog;
mod document;
mod draft;
mod entry;
mod tags;

pub use document::Document;
pub use draft::NewEntry;
pub use entry::{newest_first, Entry, Pricing};
pub use tags::TagSet;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while encoding model records.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value outside a closed domain.
    #[error("unknown pricing model: {0}")]
    UnknownPricing(String),
}
