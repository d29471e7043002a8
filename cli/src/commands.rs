//! Command implementations. Each one wires the core components the way a
//! client would: mirror the collection, then query or write through it.

use anyhow::{Context, Result};
use std::sync::Arc;
use tooldir_mirror::{LiveMirror, MirrorConfig, Snapshot};
use tooldir_model::Entry;
use tooldir_query::{apply_with_summary, extract_facets, Criteria, Facets, View};
use tooldir_session::{
    IdentityRecord, InMemoryIdentityProvider, Session, SessionConfig, SessionManager,
};
use tooldir_store::InMemoryStore;
use tooldir_submit::{SubmissionForm, SubmissionWorkflow};
use tooldir_types::IdentityId;
use tracing::debug;

/// Who a submission is made as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitter {
    /// No identity: the submission is refused.
    Nobody,
    /// An anonymous identity obtained on demand.
    Guest,
    /// A named identity already signed in.
    User(String),
}

/// Mirrors the collection once and returns the snapshot.
pub async fn snapshot(store: Arc<InMemoryStore>) -> Result<Snapshot> {
    let mirror = LiveMirror::new(store, MirrorConfig::default());
    mirror.attach().await.context("Failed to mirror the collection")?;
    let entries = mirror.ready().await?;
    mirror.detach().await;
    debug!("Snapshot holds {} entries", entries.len());
    Ok(entries)
}

pub async fn browse(store: Arc<InMemoryStore>, criteria: &Criteria) -> Result<View> {
    let entries = snapshot(store).await?;
    Ok(apply_with_summary(&entries, criteria))
}

pub async fn facets(store: Arc<InMemoryStore>) -> Result<Facets> {
    let entries = snapshot(store).await?;
    Ok(extract_facets(&entries))
}

/// Submits `form` as `submitter` and returns the entry as the mirror sees it.
pub async fn submit(
    store: Arc<InMemoryStore>,
    form: &SubmissionForm,
    submitter: Submitter,
) -> Result<Entry> {
    let provider = match &submitter {
        Submitter::User(name) => InMemoryIdentityProvider::with_identity(IdentityRecord::named(
            IdentityId::generate(),
            name.as_str(),
            None,
        )),
        Submitter::Nobody | Submitter::Guest => InMemoryIdentityProvider::new(),
    };
    let manager = SessionManager::new(Arc::new(provider), SessionConfig::default());
    manager.init()?;

    let workflow = SubmissionWorkflow::new(store.clone());
    let id = match submitter {
        Submitter::Guest => workflow.submit_after_login(form, &manager).await?,
        Submitter::User(_) => {
            let mut rx = manager.watch();
            tokio::time::timeout(
                manager.config().resolve_timeout,
                rx.wait_for(Session::is_resolved),
            )
            .await
            .context("Identity provider did not report the signed-in user")??;
            workflow.submit_current(form, &manager).await?
        }
        Submitter::Nobody => workflow.submit_current(form, &manager).await?,
    };
    manager.teardown();

    let entries = snapshot(store).await?;
    entries
        .iter()
        .find(|entry| entry.id == id)
        .cloned()
        .with_context(|| format!("Entry {id} is missing from the collection"))
}
