use serde::{Deserialize, Serialize};
use tooldir_types::{EntryId, ServerTimestamp};

/// A raw document as delivered by the remote collection store.
///
/// `data` holds the JSON body exactly as stored. Nothing about its shape is
/// trusted: [`crate::Entry::from_document`] decodes it field by field.
/// `created_at` is `None` while the store has not yet stamped the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: EntryId,
    pub created_at: Option<ServerTimestamp>,
    pub data: serde_json::Value,
}

impl Document {
    pub fn new(id: EntryId, created_at: Option<ServerTimestamp>, data: serde_json::Value) -> Self {
        Self {
            id,
            created_at,
            data,
        }
    }

    /// Extract a string value from `data` using a JSON pointer (e.g., "/name").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a non-negative integer from `data` using a JSON pointer.
    /// Floats with no fractional part are accepted.
    pub fn get_u64(&self, pointer: &str) -> Option<u64> {
        let value = self.data.pointer(pointer)?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
    }

    /// Extract an array from `data` using a JSON pointer.
    pub fn get_array(&self, pointer: &str) -> Option<&Vec<serde_json::Value>> {
        self.data.pointer(pointer).and_then(|v| v.as_array())
    }
}
