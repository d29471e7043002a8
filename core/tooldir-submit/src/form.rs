use crate::error::{FormField, ValidationError};
use tooldir_model::catalog::{remaining_suggestions, DEFAULT_CATEGORY, DEFAULT_PRICING};
use tooldir_model::{NewEntry, Pricing, TagSet};
use tooldir_session::Identity;

/// What the user typed into the submission form.
///
/// Kept intact by every submission attempt, so a failed submit can be
/// retried without re-entering anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub name: String,
    pub description: String,
    /// Optional. Stored trimmed, or not at all when blank.
    pub website_url: String,
    pub category: String,
    pub pricing: Pricing,
    pub tags: TagSet,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            website_url: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            pricing: DEFAULT_PRICING,
            tags: TagSet::new(),
        }
    }
}

impl SubmissionForm {
    /// A blank form with the default category and pricing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a typed tag. Trimmed; blank and duplicate tags are ignored.
    /// Returns whether the tag was added.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        self.tags.insert_trimmed(raw)
    }

    /// Removes a tag. Returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Suggested tags not yet on the form.
    pub fn suggested_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        remaining_suggestions(&self.tags)
    }

    /// Checks the required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(FormField::Name);
        }
        if self.description.trim().is_empty() {
            missing.push(FormField::Description);
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Builds the write payload attributed to `identity`. Does not validate.
    pub fn to_new_entry(&self, identity: &Identity) -> NewEntry {
        let website_url = self.website_url.trim();
        let category = self.category.trim();
        NewEntry {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            website_url: (!website_url.is_empty()).then(|| website_url.to_string()),
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category.to_string()
            },
            pricing: self.pricing,
            tags: self.tags.normalized(),
            rating_sum: 0,
            rating_count: 0,
            comment_count: 0,
            submitted_by: identity.id.clone(),
            submitted_by_name: identity.display_name.clone(),
            submitted_by_photo: identity.photo_url.clone(),
        }
    }
}
