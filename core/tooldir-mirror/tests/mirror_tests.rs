use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tooldir_mirror::{LiveMirror, MirrorConfig, MirrorError, MirrorState};
use tooldir_model::{Document, NewEntry, Pricing, TagSet};
use tooldir_store::{
    CollectionStore, InMemoryStore, StoreError, StoreNotification, StoreResult, StoreSubscription,
};
use tooldir_types::{EntryId, IdentityId, ServerTimestamp, SubscriptionId};

const APPS: &str = "apps";

fn doc(id: &str, millis: u64, name: &str) -> Document {
    Document::new(
        EntryId::new(id),
        Some(ServerTimestamp::from_millis(millis)),
        json!({ "name": name, "description": "d", "category": "PKM" }),
    )
}

fn new_entry(name: &str) -> NewEntry {
    NewEntry {
        name: name.to_string(),
        description: "desc".to_string(),
        website_url: None,
        category: "PKM".to_string(),
        pricing: Pricing::Free,
        tags: TagSet::new(),
        rating_sum: 0,
        rating_count: 0,
        comment_count: 0,
        submitted_by: IdentityId::new("user-1"),
        submitted_by_name: None,
        submitted_by_photo: None,
    }
}

fn make_mirror(store: Arc<InMemoryStore>) -> LiveMirror {
    LiveMirror::new(store, MirrorConfig::default())
}

async fn settle<F>(mirror: &LiveMirror, predicate: F) -> MirrorState
where
    F: FnMut(&MirrorState) -> bool,
{
    let mut rx = mirror.watch();
    let state = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("mirror did not settle")
        .expect("mirror dropped");
    state.clone()
}

fn names(state: &MirrorState) -> Vec<String> {
    state
        .entries()
        .map(|entries| entries.iter().map(|e| e.name.clone()).collect())
        .unwrap_or_default()
}

/// A store that accepts subscriptions but never notifies.
#[derive(Default)]
struct SilentStore {
    senders: Mutex<Vec<mpsc::UnboundedSender<StoreNotification>>>,
}

#[async_trait]
impl CollectionStore for SilentStore {
    async fn subscribe_ordered_by_creation(&self, _collection: &str) -> StoreResult<StoreSubscription> {
        let (sender, notifications) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(sender);
        Ok(StoreSubscription {
            id: SubscriptionId::new(1),
            notifications,
        })
    }

    fn unsubscribe(&self, _id: SubscriptionId) -> bool {
        self.senders.lock().unwrap().pop().is_some()
    }

    async fn create(&self, _collection: &str, _entry: NewEntry) -> StoreResult<EntryId> {
        Err(StoreError::Unavailable("silent".into()))
    }
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn default_config_mirrors_apps() {
    assert_eq!(MirrorConfig::default().collection, APPS);
}

// ── Attach ───────────────────────────────────────────────────────

#[tokio::test]
async fn new_mirror_is_detached() {
    let mirror = make_mirror(Arc::new(InMemoryStore::new()));
    assert_eq!(mirror.state(), MirrorState::Detached);
    assert!(mirror.snapshot().is_none());
    assert!(!mirror.is_attached().await);
    assert_eq!(mirror.ready().await, Err(MirrorError::NotAttached));
}

#[tokio::test]
async fn loading_until_first_notification() {
    let mirror = LiveMirror::new(Arc::new(SilentStore::default()), MirrorConfig::default());
    mirror.attach().await.unwrap();

    assert_eq!(mirror.state(), MirrorState::Loading);
    let waited = tokio::time::timeout(Duration::from_millis(50), mirror.ready()).await;
    assert!(waited.is_err(), "ready() must wait while loading");
}

#[tokio::test]
async fn attach_publishes_initial_snapshot() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(APPS, vec![doc("a", 100, "Alpha"), doc("b", 200, "Beta")]);

    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    let entries = mirror.ready().await.unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Beta", "Alpha"]);
    assert_eq!(store.subscriber_count(), 1);
}

#[tokio::test]
async fn attach_empty_collection_is_ready_not_loading() {
    let mirror = make_mirror(Arc::new(InMemoryStore::new()));
    mirror.attach().await.unwrap();
    assert!(mirror.ready().await.unwrap().is_empty());
    assert!(mirror.state().is_ready());
}

#[tokio::test]
async fn double_attach_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    assert_eq!(mirror.attach().await, Err(MirrorError::AlreadyAttached));
    assert_eq!(store.subscriber_count(), 1);
}

#[tokio::test]
async fn mirrors_configured_collection_only() {
    let store = Arc::new(InMemoryStore::new());
    store.seed("other", vec![doc("x", 1, "Elsewhere")]);
    store.seed("tools", vec![doc("t", 1, "Tool")]);

    let mirror = LiveMirror::new(
        store,
        MirrorConfig {
            collection: "tools".into(),
        },
    );
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();
    assert_eq!(names(&mirror.state()), vec!["Tool"]);
}

// ── Updates ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_publishes_full_snapshot() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(APPS, vec![doc("a", 100, "Alpha")]);
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();

    store.create(APPS, new_entry("Fresh")).await.unwrap();

    let state = settle(&mirror, |s| s.entries().is_some_and(|e| e.len() == 2)).await;
    assert_eq!(names(&state), vec!["Fresh", "Alpha"]);
}

#[tokio::test]
async fn out_of_order_and_duplicate_payloads_are_normalised() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();

    store.push_raw(
        APPS,
        vec![
            doc("a", 100, "Alpha"),
            doc("c", 300, "Gamma"),
            doc("a", 100, "Alpha v2"),
            doc("b", 200, "Beta"),
        ],
    );

    let state = settle(&mirror, |s| s.entries().is_some_and(|e| e.len() == 3)).await;
    assert_eq!(names(&state), vec!["Gamma", "Beta", "Alpha v2"]);
}

#[tokio::test]
async fn published_snapshots_are_not_mutated_by_later_ones() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(APPS, vec![doc("a", 100, "Alpha")]);
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    let first = mirror.ready().await.unwrap();

    store.create(APPS, new_entry("Fresh")).await.unwrap();
    settle(&mirror, |s| s.entries().is_some_and(|e| e.len() == 2)).await;

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name, "Alpha");
}

// ── Failure ──────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_failure_is_failed_not_empty() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_next_subscribe(StoreError::Unavailable("offline".into()));
    let mirror = make_mirror(store.clone());

    let err = mirror.attach().await.unwrap_err();
    assert_eq!(err, MirrorError::Subscription(StoreError::Unavailable("offline".into())));
    assert_eq!(mirror.state().failure(), Some("store unavailable: offline"));
    assert!(mirror.snapshot().is_none());
    assert!(matches!(mirror.ready().await, Err(MirrorError::Failed(_))));
    assert!(!mirror.is_attached().await);
}

#[tokio::test]
async fn pushed_failure_is_sticky_until_reattach() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(APPS, vec![doc("a", 100, "Alpha")]);
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();

    store.push_failure(APPS, "permission denied");
    let state = settle(&mirror, |s| s.failure().is_some()).await;
    assert_eq!(state.failure(), Some("permission denied"));

    // Later writes do not silently revive the mirror.
    store.create(APPS, new_entry("Fresh")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(mirror.state().failure(), Some("permission denied"));

    mirror.reattach().await.unwrap();
    let entries = mirror.ready().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(store.subscriber_count(), 1);
}

#[tokio::test]
async fn closed_channel_becomes_failed() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();

    store.close_subscriptions(APPS);

    let state = settle(&mirror, |s| s.failure().is_some()).await;
    assert_eq!(state.failure(), Some("subscription closed"));
}

// ── Detach ───────────────────────────────────────────────────────

#[tokio::test]
async fn detach_releases_subscription_once() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    assert_eq!(store.subscriber_count(), 1);

    assert!(mirror.detach().await);
    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(mirror.state(), MirrorState::Detached);

    assert!(!mirror.detach().await);
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test]
async fn detach_does_not_report_failure() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();

    mirror.detach().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(mirror.state(), MirrorState::Detached);
}

#[tokio::test]
async fn drop_releases_subscription() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    assert_eq!(store.subscriber_count(), 1);

    drop(mirror);
    assert_eq!(store.subscriber_count(), 0);
}

// ── Listeners ────────────────────────────────────────────────────

#[tokio::test]
async fn on_snapshot_sees_every_publication() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _listener = mirror.on_snapshot(move |entries| sink.lock().unwrap().push(entries.len()));

    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.create(APPS, new_entry("One")).await.unwrap();
    settle(&mirror, |s| s.entries().is_some_and(|e| e.len() == 1)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
}

#[tokio::test]
async fn on_snapshot_starts_with_current_snapshot() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(APPS, vec![doc("a", 1, "Alpha")]);
    let mirror = make_mirror(store);
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _listener = mirror.on_snapshot(move |entries| {
        let _ = tx.send(entries.iter().map(|e| e.name.clone()).collect::<Vec<_>>());
    });

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, vec!["Alpha".to_string()]);
}

#[tokio::test]
async fn cancelled_listener_stops_receiving() {
    let store = Arc::new(InMemoryStore::new());
    let mirror = make_mirror(store.clone());
    mirror.attach().await.unwrap();
    mirror.ready().await.unwrap();

    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let listener = mirror.on_snapshot(move |_| *counter.lock().unwrap() += 1);
    tokio::time::sleep(Duration::from_millis(20)).await;
    let before = *calls.lock().unwrap();
    listener.cancel();

    store.create(APPS, new_entry("Ignored")).await.unwrap();
    settle(&mirror, |s| s.entries().is_some_and(|e| e.len() == 1)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(*calls.lock().unwrap(), before);
}
