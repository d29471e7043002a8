use crate::criteria::ALL_CATEGORIES;
use serde::Serialize;
use std::collections::BTreeSet;
use tooldir_model::Entry;

/// Distinct filter options present in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// `"All"`, then every non-empty category in ascending order.
    pub categories: Vec<String>,
    /// Every tag in ascending order.
    pub tags: Vec<String>,
}

impl Default for Facets {
    fn default() -> Self {
        Self {
            categories: vec![ALL_CATEGORIES.to_string()],
            tags: Vec::new(),
        }
    }
}

impl Facets {
    /// The first `limit` categories, sentinel included.
    pub fn visible_categories(&self, limit: usize) -> &[String] {
        &self.categories[..limit.min(self.categories.len())]
    }

    /// The first `limit` tags.
    pub fn visible_tags(&self, limit: usize) -> &[String] {
        &self.tags[..limit.min(self.tags.len())]
    }

    /// How many tags [`visible_tags`](Self::visible_tags) leaves out.
    pub fn hidden_tag_count(&self, limit: usize) -> usize {
        self.tags.len().saturating_sub(limit)
    }
}

/// Collects the distinct categories and tags of `entries`.
///
/// Independent of input order. Entries without a category contribute none;
/// a literal `"All"` category is folded into the leading sentinel.
pub fn extract_facets(entries: &[Entry]) -> Facets {
    let mut categories = BTreeSet::new();
    let mut tags = BTreeSet::new();

    for entry in entries {
        if !entry.category.is_empty() && entry.category != ALL_CATEGORIES {
            categories.insert(entry.category.as_str());
        }
        tags.extend(entry.tags.iter().map(String::as_str));
    }

    let mut facets = Facets::default();
    facets.categories.extend(categories.into_iter().map(str::to_string));
    facets.tags = tags.into_iter().map(str::to_string).collect();
    facets
}
