//! Entry submission for Tooldir.
//!
//! A [`SubmissionForm`] holds raw user input. [`SubmissionWorkflow::submit`]
//! checks the session, validates the form, normalises it into a
//! [`tooldir_model::NewEntry`] and hands it to the store in a single create.
//! Every refusal happens before the store is called.

mod error;
mod form;
mod workflow;

pub use error::{FormField, SubmitError, SubmitResult, ValidationError};
pub use form::SubmissionForm;
pub use workflow::SubmissionWorkflow;
