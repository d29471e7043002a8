//! Seed files: a JSON array of entries in the store's wire shape, each with
//! an optional `id` and an optional RFC 3339 `createdAt`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tooldir_model::Document;
use tooldir_store::{InMemoryStore, DEFAULT_COLLECTION};
use tooldir_types::{EntryId, ServerTimestamp};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    data: Map<String, Value>,
}

/// Converts a store timestamp to UTC, if representable.
pub fn to_datetime(ts: ServerTimestamp) -> Option<DateTime<Utc>> {
    i64::try_from(ts.wall_time())
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

fn to_server_timestamp(at: DateTime<Utc>) -> Result<ServerTimestamp> {
    let millis = u64::try_from(at.timestamp_millis())
        .with_context(|| format!("createdAt {at} is before 1970"))?;
    Ok(ServerTimestamp::from_millis(millis))
}

fn into_document(record: SeedRecord) -> Result<Document> {
    let id = match record.id {
        Some(id) => id
            .parse::<EntryId>()
            .with_context(|| format!("Invalid entry id {id:?}"))?,
        None => EntryId::generate(),
    };
    let created_at = record.created_at.map(to_server_timestamp).transpose()?;
    Ok(Document::new(id, created_at, Value::Object(record.data)))
}

fn from_document(doc: &Document) -> SeedRecord {
    SeedRecord {
        id: Some(doc.id.to_string()),
        created_at: doc.created_at.and_then(to_datetime),
        data: doc.data.as_object().cloned().unwrap_or_default(),
    }
}

/// Parses seed JSON into store documents. Entries without an id get a
/// fresh one; entries without `createdAt` are pending.
pub fn parse_seed(json: &str) -> Result<Vec<Document>> {
    let records: Vec<SeedRecord> =
        serde_json::from_str(json).context("Seed must be a JSON array of entry objects")?;
    records.into_iter().map(into_document).collect()
}

/// Reads and parses a seed file.
pub fn load_seed(path: &Path) -> Result<Vec<Document>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    parse_seed(&json).with_context(|| format!("Failed to parse seed file {}", path.display()))
}

/// Writes `documents` back out in seed format.
pub fn save_seed(path: &Path, documents: &[Document]) -> Result<()> {
    let records: Vec<SeedRecord> = documents.iter().map(from_document).collect();
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json).with_context(|| format!("Failed to write seed file {}", path.display()))
}

/// Builds an in-memory store holding the seed file's entries, or an empty
/// store when no file is given.
pub fn seeded_store(path: Option<&Path>) -> Result<Arc<InMemoryStore>> {
    let store = Arc::new(InMemoryStore::new());
    if let Some(path) = path {
        let documents = load_seed(path)?;
        info!("Loaded {} entries from {}", documents.len(), path.display());
        store.seed(DEFAULT_COLLECTION, documents);
    }
    Ok(store)
}
