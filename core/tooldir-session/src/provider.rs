//! Identity provider abstraction.

use crate::error::ProviderResult;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tooldir_types::{IdentityId, SubscriptionId};

/// An identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: IdentityId,
    pub is_anonymous: bool,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl IdentityRecord {
    /// A fresh anonymous identity.
    pub fn anonymous(id: IdentityId) -> Self {
        Self {
            id,
            is_anonymous: true,
            display_name: None,
            photo_url: None,
        }
    }

    /// A named identity.
    pub fn named(id: IdentityId, display_name: impl Into<String>, photo_url: Option<String>) -> Self {
        Self {
            id,
            is_anonymous: false,
            display_name: Some(display_name.into()),
            photo_url,
        }
    }
}

/// Stream of identity reports. `None` means no identity is present.
#[derive(Debug)]
pub struct IdentitySubscription {
    pub id: SubscriptionId,
    pub changes: mpsc::UnboundedReceiver<Option<IdentityRecord>>,
}

/// An identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registers for identity reports. The first report is the initial
    /// resolution; later ones follow every sign-in and sign-out.
    fn subscribe_identity(&self) -> IdentitySubscription;

    /// Releases a subscription. Returns `false` if it was not registered.
    fn unsubscribe_identity(&self, id: SubscriptionId) -> bool;

    /// Asks the provider to issue an anonymous identity. Success is
    /// confirmed separately by a report on the subscription.
    async fn create_anonymous_identity(&self) -> ProviderResult<()>;

    /// Tears down the current identity.
    async fn destroy_identity(&self) -> ProviderResult<()>;
}
