//! Error types for submissions.

use std::fmt;
use thiserror::Error;
use tooldir_session::SessionError;
use tooldir_store::StoreError;

/// Result type for submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// A required form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Description,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Description => "description",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The form is missing required fields. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", join(.missing))]
pub struct ValidationError {
    /// Every missing field, in form order.
    pub missing: Vec<FormField>,
}

fn join(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(FormField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while submitting an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The form is incomplete. Fix it and resubmit.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No identity. Sign in or continue as guest, then retry.
    #[error("an identity is required to submit")]
    SessionRequired,

    /// Obtaining a guest identity failed. Safe to retry.
    #[error("login failed: {0}")]
    Login(SessionError),

    /// The store rejected the write. The form is untouched.
    #[error("submission failed: {0}")]
    Submission(#[from] StoreError),
}

impl From<SessionError> for SubmitError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::SessionRequired => SubmitError::SessionRequired,
            other => SubmitError::Login(other),
        }
    }
}
