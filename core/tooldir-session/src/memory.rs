//! An in-process identity provider for tests and local runs.

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{IdentityProvider, IdentityRecord, IdentitySubscription};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tooldir_types::{IdentityId, SubscriptionId};
use tracing::debug;

#[derive(Default)]
struct Inner {
    current: Option<IdentityRecord>,
    subscribers: HashMap<SubscriptionId, mpsc::UnboundedSender<Option<IdentityRecord>>>,
    next_subscription: u64,
    fail_next_sign_in: Option<ProviderError>,
    fail_next_sign_out: Option<ProviderError>,
    sign_in_calls: usize,
}

impl Inner {
    fn broadcast(&mut self) {
        let report = self.current.clone();
        self.subscribers
            .retain(|_, sender| sender.send(report.clone()).is_ok());
    }
}

/// An in-memory [`IdentityProvider`].
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    inner: Mutex<Inner>,
}

impl InMemoryIdentityProvider {
    /// Creates a provider with no identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that already holds `record`, as after a page reload.
    pub fn with_identity(record: IdentityRecord) -> Self {
        let provider = Self::default();
        provider.lock().current = Some(record);
        provider
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Completes an external sign-in flow (e.g. OAuth) with `record`.
    pub fn sign_in(&self, record: IdentityRecord) {
        let mut inner = self.lock();
        inner.current = Some(record);
        inner.broadcast();
    }

    /// Makes the next anonymous sign-in fail with `error`.
    pub fn fail_next_sign_in(&self, error: ProviderError) {
        self.lock().fail_next_sign_in = Some(error);
    }

    /// Makes the next sign-out fail with `error`.
    pub fn fail_next_sign_out(&self, error: ProviderError) {
        self.lock().fail_next_sign_out = Some(error);
    }

    /// The identity the provider currently holds.
    pub fn current(&self) -> Option<IdentityRecord> {
        self.lock().current.clone()
    }

    /// Number of anonymous sign-in requests received.
    pub fn sign_in_calls(&self) -> usize {
        self.lock().sign_in_calls
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn subscribe_identity(&self) -> IdentitySubscription {
        let mut inner = self.lock();
        inner.next_subscription += 1;
        let id = SubscriptionId::new(inner.next_subscription);
        let (sender, changes) = mpsc::unbounded_channel();
        let _ = sender.send(inner.current.clone());
        inner.subscribers.insert(id, sender);
        IdentitySubscription { id, changes }
    }

    fn unsubscribe_identity(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    async fn create_anonymous_identity(&self) -> ProviderResult<()> {
        let mut inner = self.lock();
        inner.sign_in_calls += 1;
        if let Some(err) = inner.fail_next_sign_in.take() {
            return Err(err);
        }
        if inner.current.is_some() {
            // Already signed in: the provider keeps the existing identity.
            return Ok(());
        }
        let record = IdentityRecord::anonymous(IdentityId::generate());
        debug!("Issued anonymous identity {}", record.id);
        inner.current = Some(record);
        inner.broadcast();
        Ok(())
    }

    async fn destroy_identity(&self) -> ProviderResult<()> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next_sign_out.take() {
            return Err(err);
        }
        if let Some(old) = inner.current.take() {
            debug!("Destroyed identity {}", old.id);
        }
        inner.broadcast();
        Ok(())
    }
}
