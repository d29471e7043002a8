//! Live mirror — owns the store subscription and publishes snapshots.

use crate::error::{MirrorError, MirrorResult};
use crate::state::{rebuild_snapshot, MirrorState, Snapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tooldir_model::Entry;
use tooldir_store::{CollectionStore, StoreError, StoreNotification, DEFAULT_COLLECTION};
use tooldir_types::SubscriptionId;
use tracing::{debug, info, warn};

/// Configuration for the mirror.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Collection to mirror.
    pub collection: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

struct Attachment {
    subscription: SubscriptionId,
    task: JoinHandle<()>,
}

/// Client-side mirror of one remote collection.
pub struct LiveMirror {
    store: Arc<dyn CollectionStore>,
    config: MirrorConfig,
    state: Arc<watch::Sender<MirrorState>>,
    attachment: Mutex<Option<Attachment>>,
}

impl LiveMirror {
    /// Creates a detached mirror.
    pub fn new(store: Arc<dyn CollectionStore>, config: MirrorConfig) -> Self {
        let (state, _) = watch::channel(MirrorState::Detached);
        Self {
            store,
            config,
            state: Arc::new(state),
            attachment: Mutex::new(None),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Establishes the store subscription and starts publishing snapshots.
    ///
    /// On failure the mirror enters [`MirrorState::Failed`] and stays there
    /// until [`reattach`](Self::reattach).
    pub async fn attach(&self) -> MirrorResult<()> {
        let mut slot = self.attachment.lock().await;
        if slot.is_some() {
            return Err(MirrorError::AlreadyAttached);
        }

        self.state.send_replace(MirrorState::Loading);
        let subscription = match self
            .store
            .subscribe_ordered_by_creation(&self.config.collection)
            .await
        {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!("Failed to subscribe to '{}': {}", self.config.collection, e);
                self.state.send_replace(MirrorState::Failed(e.to_string()));
                return Err(MirrorError::Subscription(e));
            }
        };

        let task = tokio::spawn(pump(
            subscription.notifications,
            self.state.clone(),
            self.config.collection.clone(),
        ));
        info!(
            "Mirroring '{}' via subscription {}",
            self.config.collection, subscription.id
        );
        *slot = Some(Attachment {
            subscription: subscription.id,
            task,
        });
        Ok(())
    }

    /// Releases the store subscription. Returns `false` if there was none.
    pub async fn detach(&self) -> bool {
        let mut slot = self.attachment.lock().await;
        let Some(attachment) = slot.take() else {
            return false;
        };

        // Stop the pump before the channel closes so it cannot report the
        // closure as a failure.
        attachment.task.abort();
        let _ = attachment.task.await;
        self.store.unsubscribe(attachment.subscription);
        self.state.send_replace(MirrorState::Detached);
        info!("Stopped mirroring '{}'", self.config.collection);
        true
    }

    /// Drops the current subscription, if any, and subscribes again.
    /// The recovery path after [`MirrorState::Failed`].
    pub async fn reattach(&self) -> MirrorResult<()> {
        self.detach().await;
        self.attach().await
    }

    /// Whether a subscription is held.
    pub async fn is_attached(&self) -> bool {
        self.attachment.lock().await.is_some()
    }

    /// The current state. Cheap: snapshots are shared, not copied.
    pub fn state(&self) -> MirrorState {
        self.state.borrow().clone()
    }

    /// The current snapshot, when ready.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.state.borrow().entries().cloned()
    }

    /// A receiver that observes every state change.
    pub fn watch(&self) -> watch::Receiver<MirrorState> {
        self.state.subscribe()
    }

    /// Waits until the mirror leaves `Loading` and returns the snapshot.
    pub async fn ready(&self) -> MirrorResult<Snapshot> {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(MirrorState::is_settled)
            .await
            .map(|state| state.clone())
            .map_err(|_| MirrorError::NotAttached)?;
        match settled {
            MirrorState::Ready(entries) => Ok(entries),
            MirrorState::Failed(reason) => Err(MirrorError::Failed(reason)),
            MirrorState::Detached | MirrorState::Loading => Err(MirrorError::NotAttached),
        }
    }

    /// Invokes `callback` with the full entry list for the current snapshot
    /// (if ready) and every later one, until the listener is cancelled or
    /// dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_snapshot<F>(&self, callback: F) -> SnapshotListener
    where
        F: Fn(&[Entry]) + Send + 'static,
    {
        let mut rx = self.state.subscribe();
        let task = tokio::spawn(async move {
            let mut current = rx.borrow_and_update().entries().cloned();
            loop {
                if let Some(entries) = current.take() {
                    callback(&entries);
                }
                if rx.changed().await.is_err() {
                    break;
                }
                current = rx.borrow_and_update().entries().cloned();
            }
        });
        SnapshotListener { task }
    }
}

impl Drop for LiveMirror {
    fn drop(&mut self) {
        if let Some(attachment) = self.attachment.get_mut().take() {
            attachment.task.abort();
            self.store.unsubscribe(attachment.subscription);
        }
    }
}

async fn pump(
    mut notifications: mpsc::UnboundedReceiver<StoreNotification>,
    state: Arc<watch::Sender<MirrorState>>,
    collection: String,
) {
    while let Some(notification) = notifications.recv().await {
        match notification {
            StoreNotification::Snapshot(documents) => {
                let rebuilt = rebuild_snapshot(&documents);
                debug!(
                    "Rebuilt '{}': {} entries ({} duplicates dropped)",
                    collection,
                    rebuilt.entries.len(),
                    rebuilt.duplicates
                );
                state.send_replace(MirrorState::Ready(rebuilt.entries.into()));
            }
            StoreNotification::Failed(reason) => {
                warn!("Subscription to '{}' failed: {}", collection, reason);
                state.send_replace(MirrorState::Failed(reason));
                return;
            }
        }
    }

    warn!("Subscription to '{}' closed by the store", collection);
    state.send_replace(MirrorState::Failed(StoreError::SubscriptionClosed.to_string()));
}

/// A registered snapshot callback. Cancelled on drop.
#[derive(Debug)]
pub struct SnapshotListener {
    task: JoinHandle<()>,
}

impl SnapshotListener {
    /// Stops invoking the callback.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for SnapshotListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
