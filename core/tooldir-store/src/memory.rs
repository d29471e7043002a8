//! An in-process collection store.
//!
//! Behaves like the remote store as far as the core can observe: ids and
//! timestamps are assigned on write, every subscriber receives the complete
//! ordered collection after each change, and failures can be injected.

use crate::error::{StoreError, StoreResult};
use crate::store::{CollectionStore, StoreNotification, StoreSubscription};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tooldir_model::{newest_first, Document, NewEntry};
use tooldir_types::{EntryId, ServerTimestamp, SubscriptionId};
use tracing::{debug, info, warn};

struct Subscriber {
    collection: String,
    sender: mpsc::UnboundedSender<StoreNotification>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    subscribers: HashMap<SubscriptionId, Subscriber>,
    next_subscription: u64,
    clock: Option<ServerTimestamp>,
    fail_next_create: Option<StoreError>,
    fail_next_subscribe: Option<StoreError>,
    create_calls: usize,
}

impl Inner {
    fn next_timestamp(&mut self) -> ServerTimestamp {
        let next = match self.clock {
            Some(last) => last.tick(),
            None => ServerTimestamp::now(),
        };
        self.clock = Some(next);
        next
    }

    fn ordered(&self, collection: &str) -> Vec<Document> {
        let mut docs = self.collections.get(collection).cloned().unwrap_or_default();
        docs.sort_by(|a, b| newest_first(a.created_at, b.created_at));
        docs
    }

    /// Sends `notification` to every subscriber of `collection`, dropping
    /// subscribers whose receiver is gone.
    fn notify(&mut self, collection: &str, notification: StoreNotification) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|id, sub| {
            if sub.collection != collection {
                return true;
            }
            if sub.sender.send(notification.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                debug!("Dropping subscriber {} with closed receiver", id);
                false
            }
        });
        delivered
    }

    fn publish(&mut self, collection: &str) -> usize {
        let snapshot = self.ordered(collection);
        self.notify(collection, StoreNotification::Snapshot(snapshot))
    }
}

/// An in-memory [`CollectionStore`].
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads existing documents into `collection` as if they had been
    /// written earlier, and notifies subscribers.
    pub fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        let mut inner = self.lock();
        let docs = inner.collections.entry(collection.to_string()).or_default();
        let before = docs.len();
        docs.extend(documents);
        let added = docs.len() - before;
        info!("Seeded {} documents into '{}'", added, collection);
        inner.publish(collection);
    }

    /// Current contents of `collection`, newest first.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock().ordered(collection)
    }

    /// Pushes an arbitrary notification payload to subscribers of
    /// `collection`, bypassing the store's own ordering.
    pub fn push_raw(&self, collection: &str, documents: Vec<Document>) -> usize {
        self.lock().notify(collection, StoreNotification::Snapshot(documents))
    }

    /// Tells subscribers of `collection` that the subscription failed.
    pub fn push_failure(&self, collection: &str, reason: impl Into<String>) -> usize {
        self.lock()
            .notify(collection, StoreNotification::Failed(reason.into()))
    }

    /// Drops every subscriber of `collection` without notice, closing their channels.
    pub fn close_subscriptions(&self, collection: &str) {
        self.lock()
            .subscribers
            .retain(|_, sub| sub.collection != collection);
    }

    /// Makes the next `create` fail with `error`.
    pub fn fail_next_create(&self, error: StoreError) {
        self.lock().fail_next_create = Some(error);
    }

    /// Makes the next subscribe attempt fail with `error`.
    pub fn fail_next_subscribe(&self, error: StoreError) {
        self.lock().fail_next_subscribe = Some(error);
    }

    /// Number of live subscriptions across all collections.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Number of `create` calls received, successful or not.
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    async fn subscribe_ordered_by_creation(&self, collection: &str) -> StoreResult<StoreSubscription> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next_subscribe.take() {
            warn!("Refusing subscription to '{}': {}", collection, err);
            return Err(err);
        }

        inner.next_subscription += 1;
        let id = SubscriptionId::new(inner.next_subscription);
        let (sender, notifications) = mpsc::unbounded_channel();

        // Initial snapshot, delivered before any later change.
        let snapshot = inner.ordered(collection);
        let _ = sender.send(StoreNotification::Snapshot(snapshot));

        inner.subscribers.insert(
            id,
            Subscriber {
                collection: collection.to_string(),
                sender,
            },
        );
        debug!("Subscription {} registered on '{}'", id, collection);

        Ok(StoreSubscription { id, notifications })
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().subscribers.remove(&id).is_some();
        if removed {
            debug!("Subscription {} released", id);
        }
        removed
    }

    async fn create(&self, collection: &str, entry: NewEntry) -> StoreResult<EntryId> {
        let mut inner = self.lock();
        inner.create_calls += 1;
        if let Some(err) = inner.fail_next_create.take() {
            warn!("Rejecting create in '{}': {}", collection, err);
            return Err(err);
        }

        let id = EntryId::generate();
        let created_at = inner.next_timestamp();
        let document = entry.into_document(id.clone(), created_at)?;

        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        let delivered = inner.publish(collection);
        info!(
            "Created {} in '{}' ({} subscribers notified)",
            id, collection, delivered
        );

        Ok(id)
    }
}
