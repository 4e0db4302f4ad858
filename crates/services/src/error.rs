//! Shared error types for the services crate.

use thiserror::Error;

use remote::ApiConfigError;
use revise_core::ModelError;

/// Errors emitted while setting up a revision session.
///
/// Runtime failures (load, grading) never surface here: the session
/// controller absorbs them into its phases.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid session request: {0}")]
    Request(#[from] ModelError),
    #[error(transparent)]
    Config(#[from] ApiConfigError),
}
