//! Mirror state and snapshot rebuild.
//!
//! The rebuild is a pure function of one notification payload, so it can be
//! tested without a store and reasoned about independently of delivery.

use std::collections::HashMap;
use std::sync::Arc;
use tooldir_model::{newest_first, Document, Entry};
use tooldir_types::EntryId;

/// An immutable, ordered, duplicate-free view of the collection.
pub type Snapshot = Arc<[Entry]>;

/// What the mirror currently knows about the collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MirrorState {
    /// No subscription.
    #[default]
    Detached,
    /// Subscribed, waiting for the first notification.
    Loading,
    /// The latest complete snapshot.
    Ready(Snapshot),
    /// The subscription could not be established or broke. Sticky until
    /// the mirror is reattached.
    Failed(String),
}

impl MirrorState {
    /// The snapshot, when ready.
    pub fn entries(&self) -> Option<&Snapshot> {
        match self {
            MirrorState::Ready(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, MirrorState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, MirrorState::Ready(_))
    }

    /// The failure reason, when failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            MirrorState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Whether the state will not change without new input from the store.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    /// Short state name for logs.
    pub fn state_name(&self) -> &'static str {
        match self {
            MirrorState::Detached => "detached",
            MirrorState::Loading => "loading",
            MirrorState::Ready(_) => "ready",
            MirrorState::Failed(_) => "failed",
        }
    }
}

/// Result of rebuilding a snapshot from one notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebuild {
    /// Entries newest first, one per id.
    pub entries: Vec<Entry>,
    /// Documents dropped because a later document had the same id.
    pub duplicates: usize,
}

/// Decodes `documents` into the mirror's ordered entry list.
///
/// - one entry per id; when an id repeats, the later document's content
///   replaces the earlier one
/// - ordered by creation time descending, pending writes first, stable for
///   equal timestamps
pub fn rebuild_snapshot(documents: &[Document]) -> Rebuild {
    let mut entries: Vec<Entry> = Vec::with_capacity(documents.len());
    let mut positions: HashMap<EntryId, usize> = HashMap::with_capacity(documents.len());
    let mut duplicates = 0;

    for doc in documents {
        let entry = Entry::from_document(doc);
        match positions.get(&doc.id) {
            Some(&index) => {
                entries[index] = entry;
                duplicates += 1;
            }
            None => {
                positions.insert(doc.id.clone(), entries.len());
                entries.push(entry);
            }
        }
    }

    entries.sort_by(|a, b| newest_first(a.created_at, b.created_at));
    Rebuild {
        entries,
        duplicates,
    }
}
