use crate::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tooldir_model::{Entry, Pricing};

/// Category sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Pricing sentinel meaning "no pricing filter".
pub const ALL_PRICING: &str = "all";

// ── Category ─────────────────────────────────────────────────────

/// Category filter. Categories are an open domain, so any string selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn only(category: impl Into<String>) -> Self {
        Self::from(category.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }

    /// Exact, case-sensitive comparison.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

/// The `"All"` sentinel and the empty string both mean no filter.
impl From<String> for CategoryFilter {
    fn from(s: String) -> Self {
        if s.is_empty() || s == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(s)
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Only(category) => category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORIES),
            CategoryFilter::Only(category) => f.write_str(category),
        }
    }
}

// ── Pricing ──────────────────────────────────────────────────────

/// Pricing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PricingFilter {
    #[default]
    All,
    Only(Pricing),
}

impl PricingFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, PricingFilter::All)
    }

    /// Entries with unknown pricing only pass [`PricingFilter::All`].
    pub fn matches(&self, pricing: Option<Pricing>) -> bool {
        match self {
            PricingFilter::All => true,
            PricingFilter::Only(wanted) => pricing == Some(*wanted),
        }
    }
}

impl From<Pricing> for PricingFilter {
    fn from(pricing: Pricing) -> Self {
        PricingFilter::Only(pricing)
    }
}

impl FromStr for PricingFilter {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL_PRICING) {
            return Ok(PricingFilter::All);
        }
        trimmed
            .parse::<Pricing>()
            .map(PricingFilter::Only)
            .map_err(|_| QueryError::UnknownPricing(s.to_string()))
    }
}

impl TryFrom<String> for PricingFilter {
    type Error = QueryError;

    fn try_from(s: String) -> QueryResult<Self> {
        s.parse()
    }
}

impl From<PricingFilter> for String {
    fn from(filter: PricingFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for PricingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingFilter::All => f.write_str(ALL_PRICING),
            PricingFilter::Only(pricing) => write!(f, "{pricing}"),
        }
    }
}

// ── Sort ─────────────────────────────────────────────────────────

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Creation time, newest first. Pending writes lead.
    #[default]
    Newest,
    /// Creation time, oldest first. Pending writes trail.
    Oldest,
    /// Average rating, highest first. Unrated counts as 0.
    TopRated,
    /// Number of ratings, most first.
    MostReviewed,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Every key, in menu order.
    pub const ALL: [SortKey; 6] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::TopRated,
        SortKey::MostReviewed,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::TopRated => "top-rated",
            SortKey::MostReviewed => "most-reviewed",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Newest => "Newest First",
            SortKey::Oldest => "Oldest First",
            SortKey::TopRated => "Top Rated",
            SortKey::MostReviewed => "Most Reviewed",
            SortKey::NameAsc => "Name A-Z",
            SortKey::NameDesc => "Name Z-A",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        let trimmed = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| QueryError::UnknownSortKey(s.to_string()))
    }
}

// ── Criteria ─────────────────────────────────────────────────────

/// The user's current filter and sort selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Criteria {
    /// Case-insensitive substring matched against name, description and tags.
    pub search_text: String,
    pub category: CategoryFilter,
    pub pricing: PricingFilter,
    /// Tags an entry must all carry. Exact match, no duplicates.
    pub tags: Vec<String>,
    pub sort: SortKey,
}

impl Criteria {
    /// No filters, newest first.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingFilter) -> Self {
        self.pricing = pricing;
        self
    }

    /// Adds a required tag. Already-required tags are ignored.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Adds `tag` to the required tags, or removes it if already required.
    /// Returns whether the tag is required afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
            false
        } else {
            self.tags.push(tag.to_string());
            true
        }
    }

    /// Resets every filter and the sort order.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any filter narrows the result. The sort order alone does not.
    pub fn has_active_filters(&self) -> bool {
        !self.search_text.is_empty()
            || !self.category.is_all()
            || !self.pricing.is_all()
            || !self.tags.is_empty()
    }

    /// Whether `entry` passes every filter.
    pub fn matches(&self, entry: &Entry) -> bool {
        crate::engine::Matcher::new(self).matches(entry)
    }
}
