//! Shared error types for the services crate.

use thiserror::Error;

use lingo_core::model::{SessionId, WordListError};
use lingo_core::session::TransitionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the AI content and speech clients.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content service is not configured")]
    Disabled,
    #[error("content service returned an empty response")]
    EmptyResponse,
    #[error("content service request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("content service returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors emitted by study session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("vocabulary generation returned no words")]
    GenerationFailed,
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session {0} belongs to another user")]
    Forbidden(SessionId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    WordList(#[from] WordListError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
