//! Fixed option lists offered on the submission form.
//!
//! The category domain is open: these are suggestions, and entries already
//! in the collection may carry any category string.

use crate::Pricing;

/// Categories offered to submitters.
pub const CATEGORIES: &[&str] = &[
    "Note-taking",
    "PKM",
    "Task Management",
    "Whiteboard",
    "Writing",
    "All-in-one",
    "Other",
];

/// Whether `category` is one of the offered [`CATEGORIES`]. Other values
/// are still accepted.
pub fn is_listed_category(category: &str) -> bool {
    CATEGORIES.contains(&category.trim())
}

/// Category preselected on a blank form.
pub const DEFAULT_CATEGORY: &str = "Note-taking";

/// Pricing preselected on a blank form.
pub const DEFAULT_PRICING: Pricing = Pricing::Free;

/// One-click tags shown under the tag input.
pub const SUGGESTED_TAGS: &[&str] = &[
    "AI",
    "Mobile",
    "Desktop",
    "Web",
    "Open Source",
    "Offline",
    "Collaboration",
    "Markdown",
    "Templates",
    "API",
    "Plugin Support",
    "Cross-platform",
    "Cloud Sync",
    "Privacy-focused",
    "Minimal",
    "Visual",
    "Database",
    "Spaced Repetition",
    "Graph View",
    "Kanban",
];

/// Suggested tags not yet chosen, in suggestion order.
pub fn remaining_suggestions<'a>(chosen: &'a crate::TagSet) -> impl Iterator<Item = &'static str> + 'a {
    SUGGESTED_TAGS
        .iter()
        .copied()
        .filter(move |tag| !chosen.contains(tag))
}
