//! The submission workflow: session gate, validation, one store write.

use crate::error::{SubmitError, SubmitResult};
use crate::form::SubmissionForm;
use std::sync::Arc;
use tooldir_session::{Session, SessionManager};
use tooldir_store::{CollectionStore, DEFAULT_COLLECTION};
use tooldir_types::EntryId;
use tracing::{debug, info, warn};

/// Writes new entries to the collection on behalf of the current identity.
pub struct SubmissionWorkflow {
    store: Arc<dyn CollectionStore>,
    collection: String,
}

impl SubmissionWorkflow {
    /// Submits into the default collection.
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self::with_collection(store, DEFAULT_COLLECTION)
    }

    pub fn with_collection(store: Arc<dyn CollectionStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Submits `form` as the identity held by `session`.
    ///
    /// Fails without touching the store when the session is unresolved or
    /// the form is incomplete. Otherwise performs exactly one create and
    /// returns the id the store assigned.
    pub async fn submit(&self, form: &SubmissionForm, session: &Session) -> SubmitResult<EntryId> {
        let Some(identity) = session.identity() else {
            debug!("Submission refused, no identity");
            return Err(SubmitError::SessionRequired);
        };
        form.validate()?;

        let entry = form.to_new_entry(identity);
        match self.store.create(&self.collection, entry).await {
            Ok(id) => {
                info!("Submitted '{}' as {} ({})", form.name.trim(), id, identity.id);
                Ok(id)
            }
            Err(e) => {
                warn!("Submission of '{}' failed: {}", form.name.trim(), e);
                Err(SubmitError::Submission(e))
            }
        }
    }

    /// Submits as whoever the manager reports at this moment.
    pub async fn submit_current(
        &self,
        form: &SubmissionForm,
        manager: &SessionManager,
    ) -> SubmitResult<EntryId> {
        let session = manager.current();
        self.submit(form, &session).await
    }

    /// Submits, first obtaining a guest identity if the session is
    /// unresolved. The form is validated before any login is attempted.
    pub async fn submit_after_login(
        &self,
        form: &SubmissionForm,
        manager: &SessionManager,
    ) -> SubmitResult<EntryId> {
        form.validate()?;
        if !manager.current().is_resolved() {
            debug!("Submission needs an identity, continuing as guest");
            manager.request_anonymous_login().await?;
        }
        self.submit_current(form, manager).await
    }
}
