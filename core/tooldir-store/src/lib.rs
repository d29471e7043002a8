//! Remote collection store contract for Tooldir.
//!
//! The store is an external collaborator: it accepts writes, assigns ids and
//! creation timestamps, and pushes the full ordered query result to every
//! subscriber whenever the collection changes. This crate defines that
//! contract ([`CollectionStore`]) and ships [`memory::InMemoryStore`], a
//! complete in-process implementation used by tests and the CLI.

mod error;
pub mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use store::{CollectionStore, StoreNotification, StoreSubscription, DEFAULT_COLLECTION};
