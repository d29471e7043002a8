//! Session manager — turns identity reports into session state.
//!
//! One pump task per manager consumes the provider's report stream, so
//! transitions are applied in the order the provider emits them. Readers
//! observe the state through a `watch` channel and never hold it across a
//! write.

use crate::error::{ProviderError, SessionError, SessionResult};
use crate::provider::{IdentityProvider, IdentityRecord, IdentitySubscription};
use crate::session::{Identity, Session};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tooldir_types::SubscriptionId;
use tracing::{debug, info, warn};

/// What to do when the provider reports that no identity is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnonymousPolicy {
    /// Stay unresolved until a gated action requests a guest identity.
    #[default]
    OnDemand,
    /// Request an anonymous identity immediately.
    Automatic,
}

/// Configuration for the session manager.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Anonymous sign-in policy.
    pub anonymous_policy: AnonymousPolicy,
    /// How long to wait for the provider to report an identity after a
    /// sign-in or sign-out request.
    pub resolve_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            anonymous_policy: AnonymousPolicy::OnDemand,
            resolve_timeout: Duration::from_secs(10),
        }
    }
}

struct Shared {
    provider: Arc<dyn IdentityProvider>,
    config: SessionConfig,
    state: watch::Sender<Session>,
}

impl Shared {
    async fn apply_report(&self, report: Option<IdentityRecord>) {
        let absent = report.is_none();
        let next = Session::from_record(report);
        let previous = self.state.send_replace(next.clone());
        if previous != next {
            info!(
                "Session {} -> {}",
                previous.state_name(),
                next.state_name()
            );
        }

        if absent && self.config.anonymous_policy == AnonymousPolicy::Automatic {
            debug!("No identity present, requesting an anonymous one");
            if let Err(e) = self.provider.create_anonymous_identity().await {
                warn!("Automatic anonymous sign-in failed: {}", e);
            }
        }
    }
}

struct Pump {
    subscription: SubscriptionId,
    task: JoinHandle<()>,
}

/// Tracks the current identity and gates write-capable operations.
///
/// Lifecycle: [`init`](Self::init) subscribes to the provider,
/// [`teardown`](Self::teardown) (or drop) releases the subscription.
pub struct SessionManager {
    shared: Arc<Shared>,
    pump: Mutex<Option<Pump>>,
}

impl SessionManager {
    /// Creates a manager in the `Unresolved` state. Nothing is observed
    /// until [`init`](Self::init).
    pub fn new(provider: Arc<dyn IdentityProvider>, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(Session::Unresolved);
        Self {
            shared: Arc::new(Shared {
                provider,
                config,
                state,
            }),
            pump: Mutex::new(None),
        }
    }

    fn pump_slot(&self) -> MutexGuard<'_, Option<Pump>> {
        self.pump.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Subscribes to the identity provider and starts applying its reports.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn init(&self) -> SessionResult<()> {
        let mut slot = self.pump_slot();
        if slot.is_some() {
            return Err(SessionError::AlreadyInitialized);
        }

        let IdentitySubscription { id, mut changes } = self.shared.provider.subscribe_identity();
        let shared = self.shared.clone();
        let task = tokio::spawn(async move {
            while let Some(report) = changes.recv().await {
                shared.apply_report(report).await;
            }
            debug!("Identity stream closed");
        });

        info!(
            "Session manager listening ({:?} anonymous sign-in)",
            self.shared.config.anonymous_policy
        );
        *slot = Some(Pump {
            subscription: id,
            task,
        });
        Ok(())
    }

    /// Stops listening to the provider and returns to `Unresolved`.
    /// A no-op if the manager is not running.
    pub fn teardown(&self) {
        if let Some(pump) = self.pump_slot().take() {
            pump.task.abort();
            self.shared.provider.unsubscribe_identity(pump.subscription);
            self.shared.state.send_replace(Session::Unresolved);
            info!("Session manager stopped");
        }
    }

    /// Whether [`init`](Self::init) has run and teardown has not.
    pub fn is_running(&self) -> bool {
        self.pump_slot().is_some()
    }

    /// The live session state at the moment of the call.
    pub fn current(&self) -> Session {
        self.shared.state.borrow().clone()
    }

    /// Returns the current identity, or `SessionRequired` while unresolved.
    pub fn require_identity(&self) -> SessionResult<Identity> {
        self.current()
            .identity()
            .cloned()
            .ok_or(SessionError::SessionRequired)
    }

    /// A receiver that observes every session transition.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.shared.state.subscribe()
    }

    /// Invokes `callback` with the current session, then after every
    /// transition, until the returned listener is cancelled or dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_identity_change<F>(&self, callback: F) -> SessionListener
    where
        F: Fn(&Session) + Send + 'static,
    {
        let mut rx = self.shared.state.subscribe();
        let task = tokio::spawn(async move {
            callback(&rx.borrow_and_update());
            while rx.changed().await.is_ok() {
                let session = rx.borrow_and_update().clone();
                callback(&session);
            }
        });
        SessionListener { task }
    }

    /// Obtains a guest identity if none is present.
    ///
    /// A no-op when the session is already anonymous or authenticated.
    /// Otherwise asks the provider for an anonymous identity and waits for
    /// the provider to report it, returning the resolved session. Provider
    /// failures surface as [`SessionError::IdentityProvider`]; the session is
    /// left unresolved.
    pub async fn request_anonymous_login(&self) -> SessionResult<Session> {
        let current = self.current();
        if current.is_resolved() {
            debug!("Anonymous login skipped, session is {}", current.state_name());
            return Ok(current);
        }
        if !self.is_running() {
            return Err(SessionError::NotInitialized);
        }

        let mut rx = self.shared.state.subscribe();
        if let Err(e) = self.shared.provider.create_anonymous_identity().await {
            warn!("Anonymous login failed: {}", e);
            return Err(e.into());
        }

        let waited = tokio::time::timeout(
            self.shared.config.resolve_timeout,
            rx.wait_for(Session::is_resolved),
        )
        .await;
        match waited {
            Ok(Ok(session)) => Ok(session.clone()),
            Ok(Err(_)) => Err(ProviderError::Unavailable("session manager shut down".into()).into()),
            Err(_) => {
                warn!("Identity provider accepted anonymous login but never reported it");
                Err(ProviderError::Timeout.into())
            }
        }
    }

    /// Signs the current identity out.
    ///
    /// Returns once the provider has reported that the old identity is
    /// gone, so `current()` never hands out the previous identity afterwards.
    /// Under [`AnonymousPolicy::Automatic`] a fresh anonymous identity follows.
    pub async fn logout(&self) -> SessionResult<()> {
        let Some(old) = self.current().identity_id().cloned() else {
            debug!("Logout skipped, no identity");
            return Ok(());
        };

        let mut rx = self.shared.state.subscribe();
        if let Err(e) = self.shared.provider.destroy_identity().await {
            warn!("Logout failed: {}", e);
            return Err(e.into());
        }

        let waited = tokio::time::timeout(
            self.shared.config.resolve_timeout,
            rx.wait_for(|s| s.identity_id() != Some(&old)),
        )
        .await;
        match waited {
            Ok(Ok(_)) => {
                info!("Identity {} signed out", old);
                Ok(())
            }
            Ok(Err(_)) => Err(ProviderError::Unavailable("session manager shut down".into()).into()),
            Err(_) => Err(ProviderError::Timeout.into()),
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// A registered identity-change callback. Cancelled on drop.
#[derive(Debug)]
pub struct SessionListener {
    task: JoinHandle<()>,
}

impl SessionListener {
    /// Stops invoking the callback.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
