//! Store abstraction.
//!
//! Defines the trait the mirror and the submission workflow talk to, so
//! either can run against any backend.

use crate::error::StoreResult;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tooldir_model::{Document, NewEntry};
use tooldir_types::{EntryId, SubscriptionId};

/// Collection that holds directory entries.
pub const DEFAULT_COLLECTION: &str = "apps";

/// A change notification pushed to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreNotification {
    /// The complete query result after a change, newest first.
    Snapshot(Vec<Document>),
    /// The store gave up on this subscription.
    Failed(String),
}

/// A live subscription handed out by [`CollectionStore::subscribe_ordered_by_creation`].
///
/// The owner must pass `id` back to [`CollectionStore::unsubscribe`] exactly
/// once when it loses interest.
#[derive(Debug)]
pub struct StoreSubscription {
    pub id: SubscriptionId,
    pub notifications: mpsc::UnboundedReceiver<StoreNotification>,
}

/// A remote collection store.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Registers interest in `collection` ordered by creation time,
    /// descending. The first notification carries the current contents.
    async fn subscribe_ordered_by_creation(&self, collection: &str) -> StoreResult<StoreSubscription>;

    /// Releases a subscription. Returns `false` if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Creates a document. The store assigns the id and the creation
    /// timestamp; on error nothing was written.
    async fn create(&self, collection: &str, entry: NewEntry) -> StoreResult<EntryId>;
}
