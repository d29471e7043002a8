use crate::{Document, ModelError, TagSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tooldir_types::{EntryId, IdentityId, ServerTimestamp};

/// Pricing model of a listed tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pricing {
    Free,
    Freemium,
    Paid,
}

impl Pricing {
    /// Every pricing model, in menu order.
    pub const ALL: [Pricing; 3] = [Pricing::Free, Pricing::Freemium, Pricing::Paid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pricing::Free => "Free",
            Pricing::Freemium => "Freemium",
            Pricing::Paid => "Paid",
        }
    }

    /// Decodes a stored value. Only the exact wire spelling matches, so
    /// `"free"` in a document is unknown pricing.
    pub fn from_stored(s: &str) -> Option<Self> {
        Pricing::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Pricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses user input. Case-insensitive, so `free` and `Free` both parse;
/// stored documents go through [`Pricing::from_stored`] instead.
impl FromStr for Pricing {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Pricing::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownPricing(s.to_string()))
    }
}

/// One tool listed in the directory.
///
/// Built from a store [`Document`] by [`Entry::from_document`], which never
/// fails: missing text decodes as empty, missing counters as zero, malformed
/// tags as no tags, unknown pricing as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub description: String,
    pub website_url: Option<String>,
    pub category: String,
    pub pricing: Option<Pricing>,
    pub tags: TagSet,
    pub rating_sum: u64,
    pub rating_count: u64,
    pub comment_count: u64,
    pub submitted_by: Option<IdentityId>,
    pub submitted_by_name: Option<String>,
    pub submitted_by_photo: Option<String>,
    pub created_at: Option<ServerTimestamp>,
}

impl Entry {
    /// Creates an entry with the given id and name and every other field empty.
    pub fn new(id: EntryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            website_url: None,
            category: String::new(),
            pricing: None,
            tags: TagSet::new(),
            rating_sum: 0,
            rating_count: 0,
            comment_count: 0,
            submitted_by: None,
            submitted_by_name: None,
            submitted_by_photo: None,
            created_at: None,
        }
    }

    /// Decodes a store document.
    pub fn from_document(doc: &Document) -> Self {
        let text = |pointer: &str| doc.get_str(pointer).unwrap_or_default().to_string();
        let optional = |pointer: &str| {
            doc.get_str(pointer)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let tags = doc
            .get_array("/tags")
            .map(|values| values.iter().filter_map(|v| v.as_str()).collect::<TagSet>())
            .unwrap_or_default();

        Self {
            id: doc.id.clone(),
            name: text("/name"),
            description: text("/description"),
            website_url: optional("/websiteUrl"),
            category: text("/category"),
            pricing: doc.get_str("/pricing").and_then(Pricing::from_stored),
            tags,
            rating_sum: doc.get_u64("/ratingSum").unwrap_or(0),
            rating_count: doc.get_u64("/ratingCount").unwrap_or(0),
            comment_count: doc.get_u64("/commentCount").unwrap_or(0),
            submitted_by: optional("/submittedBy").map(IdentityId::new),
            submitted_by_name: optional("/submittedByName"),
            submitted_by_photo: optional("/submittedByPhoto"),
            created_at: doc.created_at,
        }
    }

    /// Mean rating, or `None` while unrated.
    pub fn average_rating(&self) -> Option<f64> {
        if self.rating_count == 0 {
            None
        } else {
            Some(self.rating_sum as f64 / self.rating_count as f64)
        }
    }

    /// Mean rating with unrated entries counted as 0, for ordering.
    pub fn rating_score(&self) -> f64 {
        self.average_rating().unwrap_or(0.0)
    }

    /// Whether the store has not stamped this entry yet.
    pub fn is_pending(&self) -> bool {
        self.created_at.is_none()
    }
}

/// Orders creation timestamps newest first. Pending (`None`) stamps belong to
/// writes the store has not acknowledged yet, so they sort before everything.
pub fn newest_first(a: Option<ServerTimestamp>, b: Option<ServerTimestamp>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}
