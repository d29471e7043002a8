use std::sync::{Arc, Mutex};
use std::time::Duration;
use tooldir_session::{
    AnonymousPolicy, IdentityProvider, IdentityRecord, InMemoryIdentityProvider, ProviderError,
    Session, SessionConfig, SessionError, SessionManager,
};
use tooldir_types::IdentityId;

fn make_manager(provider: Arc<InMemoryIdentityProvider>, policy: AnonymousPolicy) -> SessionManager {
    SessionManager::new(
        provider,
        SessionConfig {
            anonymous_policy: policy,
            resolve_timeout: Duration::from_secs(2),
        },
    )
}

async fn settle<F>(manager: &SessionManager, predicate: F) -> Session
where
    F: FnMut(&Session) -> bool,
{
    let mut rx = manager.watch();
    let session = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("session did not settle")
        .expect("session manager dropped");
    session.clone()
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn default_config_is_on_demand() {
    let config = SessionConfig::default();
    assert_eq!(config.anonymous_policy, AnonymousPolicy::OnDemand);
    assert_eq!(config.resolve_timeout, Duration::from_secs(10));
}

// ── Lifecycle ────────────────────────────────────────────────────

#[tokio::test]
async fn starts_unresolved_before_init() {
    let manager = make_manager(Arc::new(InMemoryIdentityProvider::new()), AnonymousPolicy::OnDemand);
    assert_eq!(manager.current(), Session::Unresolved);
    assert!(!manager.is_running());
}

#[tokio::test]
async fn init_twice_is_rejected() {
    let manager = make_manager(Arc::new(InMemoryIdentityProvider::new()), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    assert_eq!(manager.init(), Err(SessionError::AlreadyInitialized));
}

#[tokio::test]
async fn teardown_releases_provider_subscription() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    assert_eq!(provider.subscriber_count(), 1);

    manager.teardown();
    assert_eq!(provider.subscriber_count(), 0);
    assert!(!manager.is_running());

    // Second teardown is a no-op.
    manager.teardown();
}

#[tokio::test]
async fn drop_releases_provider_subscription() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    {
        let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
        manager.init().unwrap();
    }
    assert_eq!(provider.subscriber_count(), 0);
}

#[tokio::test]
async fn existing_identity_resolves_on_init() {
    let provider = Arc::new(InMemoryIdentityProvider::with_identity(IdentityRecord::named(
        IdentityId::new("uid-1"),
        "Ada",
        None,
    )));
    let manager = make_manager(provider, AnonymousPolicy::OnDemand);
    manager.init().unwrap();

    let session = settle(&manager, Session::is_resolved).await;
    assert!(session.is_authenticated());
    assert_eq!(manager.require_identity().unwrap().id, IdentityId::new("uid-1"));
}

// ── On-demand policy ─────────────────────────────────────────────

#[tokio::test]
async fn on_demand_stays_unresolved_without_identity() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    tokio::task::yield_now().await;

    assert_eq!(manager.current(), Session::Unresolved);
    assert_eq!(provider.sign_in_calls(), 0);
    assert_eq!(manager.require_identity(), Err(SessionError::SessionRequired));
}

#[tokio::test]
async fn request_anonymous_login_resolves_session() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();

    let session = manager.request_anonymous_login().await.unwrap();
    assert!(session.is_anonymous());
    assert!(manager.current().is_anonymous());
    assert_eq!(provider.sign_in_calls(), 1);
}

#[tokio::test]
async fn request_anonymous_login_is_idempotent() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();

    let first = manager.request_anonymous_login().await.unwrap();
    let second = manager.request_anonymous_login().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(provider.sign_in_calls(), 1);
}

#[tokio::test]
async fn request_anonymous_login_noop_when_authenticated() {
    let provider = Arc::new(InMemoryIdentityProvider::with_identity(IdentityRecord::named(
        IdentityId::new("uid-1"),
        "Ada",
        None,
    )));
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    settle(&manager, Session::is_resolved).await;

    let session = manager.request_anonymous_login().await.unwrap();
    assert!(session.is_authenticated());
    assert_eq!(provider.sign_in_calls(), 0);
}

#[tokio::test]
async fn request_anonymous_login_surfaces_provider_failure() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    provider.fail_next_sign_in(ProviderError::Rejected("anonymous auth disabled".into()));

    let err = manager.request_anonymous_login().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::IdentityProvider(ProviderError::Rejected("anonymous auth disabled".into()))
    );
    assert_eq!(manager.current(), Session::Unresolved);

    // Retrying after a transient failure succeeds.
    assert!(manager.request_anonymous_login().await.unwrap().is_anonymous());
}

#[tokio::test]
async fn request_anonymous_login_requires_init() {
    let manager = make_manager(Arc::new(InMemoryIdentityProvider::new()), AnonymousPolicy::OnDemand);
    assert_eq!(
        manager.request_anonymous_login().await,
        Err(SessionError::NotInitialized)
    );
}

// ── Automatic policy ─────────────────────────────────────────────

#[tokio::test]
async fn automatic_policy_signs_in_anonymously_on_load() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::Automatic);
    manager.init().unwrap();

    let session = settle(&manager, Session::is_resolved).await;
    assert!(session.is_anonymous());
    assert_eq!(provider.sign_in_calls(), 1);
}

#[tokio::test]
async fn automatic_policy_failure_leaves_session_unresolved() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    provider.fail_next_sign_in(ProviderError::Unavailable("offline".into()));
    let manager = make_manager(provider.clone(), AnonymousPolicy::Automatic);
    manager.init().unwrap();

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(provider.sign_in_calls(), 1);
    assert_eq!(manager.current(), Session::Unresolved);
}

#[tokio::test]
async fn automatic_policy_re_resolves_after_logout() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::Automatic);
    manager.init().unwrap();
    let first = settle(&manager, Session::is_resolved).await;
    let first_id = first.identity_id().cloned().unwrap();

    manager.logout().await.unwrap();
    let second = settle(&manager, |s| s.is_resolved() && s.identity_id() != Some(&first_id)).await;
    assert!(second.is_anonymous());
    assert_eq!(provider.sign_in_calls(), 2);
}

// ── Logout ───────────────────────────────────────────────────────

#[tokio::test]
async fn logout_returns_to_unresolved() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    manager.request_anonymous_login().await.unwrap();

    manager.logout().await.unwrap();
    assert_eq!(manager.current(), Session::Unresolved);
    assert_eq!(provider.current(), None);
}

#[tokio::test]
async fn logout_failure_keeps_identity() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    manager.request_anonymous_login().await.unwrap();
    provider.fail_next_sign_out(ProviderError::Unavailable("offline".into()));

    let err = manager.logout().await.unwrap_err();
    assert!(matches!(err, SessionError::IdentityProvider(_)));
    assert!(manager.current().is_anonymous());
}

#[tokio::test]
async fn logout_without_identity_is_noop() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider, AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    assert_eq!(manager.logout().await, Ok(()));
}

// ── External sign-in & listeners ─────────────────────────────────

#[tokio::test]
async fn external_sign_in_upgrades_to_authenticated() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();
    manager.request_anonymous_login().await.unwrap();

    provider.sign_in(IdentityRecord::named(IdentityId::new("uid-2"), "Linus", None));
    let session = settle(&manager, Session::is_authenticated).await;
    assert_eq!(session.identity_id(), Some(&IdentityId::new("uid-2")));
}

#[tokio::test]
async fn on_identity_change_sees_current_then_transitions() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let manager = make_manager(provider.clone(), AnonymousPolicy::OnDemand);
    manager.init().unwrap();

    let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener = manager.on_identity_change(move |s| sink.lock().unwrap().push(s.state_name()));
    tokio::task::yield_now().await;

    manager.request_anonymous_login().await.unwrap();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    let names = seen.lock().unwrap().clone();
    assert_eq!(names.first(), Some(&"unresolved"));
    assert_eq!(names.last(), Some(&"anonymous"));

    listener.cancel();
    manager.logout().await.unwrap();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(seen.lock().unwrap().last(), Some(&"anonymous"));
}

#[tokio::test]
async fn provider_trait_object_is_usable() {
    let provider: Arc<dyn IdentityProvider> = Arc::new(InMemoryIdentityProvider::new());
    let sub = provider.subscribe_identity();
    assert!(provider.unsubscribe_identity(sub.id));
    assert!(!provider.unsubscribe_identity(sub.id));
}
