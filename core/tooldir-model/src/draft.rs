use crate::{Document, ModelResult, Pricing, TagSet};
use serde::Serialize;
use tooldir_types::{EntryId, IdentityId, ServerTimestamp};

/// A new entry as written to the store.
///
/// Carries everything except the id and the creation timestamp, which the
/// store assigns. Aggregate counters always start at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub category: String,
    pub pricing: Pricing,
    pub tags: TagSet,
    pub rating_sum: u64,
    pub rating_count: u64,
    pub comment_count: u64,
    pub submitted_by: IdentityId,
    pub submitted_by_name: Option<String>,
    pub submitted_by_photo: Option<String>,
}

impl NewEntry {
    /// Encodes the payload as the JSON body of a store document.
    pub fn to_json(&self) -> ModelResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Materialises the stored document once the store has assigned an id
    /// and a timestamp.
    pub fn into_document(self, id: EntryId, created_at: ServerTimestamp) -> ModelResult<Document> {
        let data = self.to_json()?;
        Ok(Document::new(id, Some(created_at), data))
    }
}
