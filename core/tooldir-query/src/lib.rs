//! Browsing queries over a mirror snapshot.
//!
//! Everything here is a pure function of an entry slice and the user's
//! [`Criteria`]:
//! - [`extract_facets`] — the distinct categories and tags offered as filters
//! - [`apply`] — the conjunctive filter pipeline followed by a stable sort
//! - [`collate`] — the name ordering used by the A-Z sorts
//!
//! Inputs are never mutated; every call builds a fresh result.

pub mod collate;
mod criteria;
mod engine;
mod facets;

pub use criteria::{CategoryFilter, Criteria, PricingFilter, SortKey, ALL_CATEGORIES, ALL_PRICING};
pub use engine::{apply, apply_with_summary, compare_entries, sort_entries, View, ViewSummary};
pub use facets::{extract_facets, Facets};

/// Result type for query parsing.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while parsing criteria from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Not one of the sort keys.
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),

    /// Neither the `all` sentinel nor a pricing model.
    #[error("unknown pricing filter: {0}")]
    UnknownPricing(String),
}
