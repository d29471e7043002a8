//! Identity and session lifecycle for Tooldir.
//!
//! The identity provider is an external collaborator that issues anonymous
//! or named identities and reports every identity transition. The
//! [`SessionManager`] turns those reports into a [`Session`] with exactly
//! one state at a time (`Unresolved`, `Anonymous`, `Authenticated`) and gates
//! write operations on it.
//!
//! # Anonymous sign-in
//!
//! Two policies are supported, chosen through [`SessionConfig`]:
//!
//! - [`AnonymousPolicy::OnDemand`] (default): the session stays `Unresolved`
//!   until a gated action calls [`SessionManager::request_anonymous_login`],
//!   typically after the user picks "continue as guest".
//! - [`AnonymousPolicy::Automatic`]: whenever the provider reports no
//!   identity, the manager requests an anonymous one itself.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tooldir_session::{InMemoryIdentityProvider, SessionConfig, SessionManager};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tooldir_session::SessionResult<()> {
//! let provider = Arc::new(InMemoryIdentityProvider::new());
//! let manager = SessionManager::new(provider, SessionConfig::default());
//! manager.init()?;
//!
//! let session = manager.request_anonymous_login().await?;
//! assert!(session.is_anonymous());
//! # Ok(())
//! # }
//! ```

mod error;
mod manager;
pub mod memory;
mod provider;
mod session;

pub use error::{ProviderError, ProviderResult, SessionError, SessionResult};
pub use manager::{AnonymousPolicy, SessionConfig, SessionListener, SessionManager};
pub use memory::InMemoryIdentityProvider;
pub use provider::{IdentityProvider, IdentityRecord, IdentitySubscription};
pub use session::{Identity, Session};
