//! Live mirror of the remote directory collection.
//!
//! # Architecture
//!
//! - **State**: [`MirrorState`] and the pure snapshot rebuild
//!   ([`rebuild_snapshot`]) that turns one store notification into an
//!   ordered, deduplicated entry list
//! - **Mirror**: [`LiveMirror`] owns the single store subscription, runs the
//!   pump task, and publishes every rebuilt snapshot
//!
//! Every publication is the complete list, never a diff, shared as an
//! immutable `Arc<[Entry]>` so readers copy on read.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tooldir_mirror::{LiveMirror, MirrorConfig};
//! use tooldir_store::InMemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tooldir_mirror::MirrorResult<()> {
//! let store = Arc::new(InMemoryStore::new());
//! let mirror = LiveMirror::new(store, MirrorConfig::default());
//! mirror.attach().await?;
//!
//! let entries = mirror.ready().await?;
//! assert!(entries.is_empty());
//! # Ok(())
//! # }
//! ```

mod error;
mod mirror;
pub mod state;

pub use error::{MirrorError, MirrorResult};
pub use mirror::{LiveMirror, MirrorConfig, SnapshotListener};
pub use state::{rebuild_snapshot, MirrorState, Rebuild, Snapshot};
