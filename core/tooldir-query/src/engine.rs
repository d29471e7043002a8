//! Filter and sort pipeline.

use crate::collate::compare_names;
use crate::criteria::{Criteria, SortKey};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use tooldir_model::{newest_first, Entry};
use tracing::trace;

/// Criteria with the search text prepared for repeated matching.
pub(crate) struct Matcher<'a> {
    criteria: &'a Criteria,
    needle: String,
}

impl<'a> Matcher<'a> {
    pub(crate) fn new(criteria: &'a Criteria) -> Self {
        Self {
            criteria,
            needle: criteria.search_text.to_lowercase(),
        }
    }

    fn matches_text(&self, entry: &Entry) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(&self.needle);
        hit(&entry.name[..])
            || hit(&entry.description[..])
            || entry.tags.iter().any(|t| hit(t.as_str()))
    }

    fn matches_tags(&self, entry: &Entry) -> bool {
        self.criteria.tags.iter().all(|tag| entry.tags.contains(tag))
    }

    pub(crate) fn matches(&self, entry: &Entry) -> bool {
        self.matches_text(entry)
            && self.criteria.category.matches(&entry.category)
            && self.criteria.pricing.matches(entry.pricing)
            && self.matches_tags(entry)
    }
}

/// Orders two entries by `key`. Ties compare `Equal`, so a stable sort keeps
/// their input order.
pub fn compare_entries(a: &Entry, b: &Entry, key: SortKey) -> Ordering {
    match key {
        SortKey::Newest => newest_first(a.created_at, b.created_at),
        SortKey::Oldest => newest_first(b.created_at, a.created_at),
        SortKey::TopRated => b.rating_score().total_cmp(&a.rating_score()),
        SortKey::MostReviewed => b.rating_count.cmp(&a.rating_count),
        SortKey::NameAsc => compare_names(&a.name, &b.name),
        SortKey::NameDesc => compare_names(&b.name, &a.name),
    }
}

/// Stable in-place sort by `key`.
pub fn sort_entries(entries: &mut [Entry], key: SortKey) {
    entries.sort_by(|a, b| compare_entries(a, b, key));
}

/// Returns the entries that pass every filter of `criteria`, ordered by its
/// sort key. `entries` is left untouched.
pub fn apply(entries: &[Entry], criteria: &Criteria) -> Vec<Entry> {
    let matcher = Matcher::new(criteria);
    let mut selected: Vec<Entry> = entries
        .iter()
        .filter(|entry| matcher.matches(entry))
        .cloned()
        .collect();
    sort_entries(&mut selected, criteria.sort);
    trace!(
        "Selected {} of {} entries, sorted {}",
        selected.len(),
        entries.len(),
        criteria.sort
    );
    selected
}

/// Counts for a "Showing X of Y" footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub total: usize,
    pub shown: usize,
}

impl ViewSummary {
    pub fn new(total: usize, shown: usize) -> Self {
        Self { total, shown }
    }

    /// Entries hidden by the filters.
    pub fn filtered_out(&self) -> usize {
        self.total.saturating_sub(self.shown)
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered_out() > 0
    }
}

impl fmt::Display for ViewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {}", self.shown, self.total)
    }
}

/// A filtered, sorted result with its counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub entries: Vec<Entry>,
    pub summary: ViewSummary,
}

/// [`apply`] plus the counts of what was shown.
pub fn apply_with_summary(entries: &[Entry], criteria: &Criteria) -> View {
    let selected = apply(entries, criteria);
    let summary = ViewSummary::new(entries.len(), selected.len());
    View {
        entries: selected,
        summary,
    }
}
