//! Error types for the session layer.

use pagecraft_store::{EntryFailure, StoreError};
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while editing content.
///
/// None of these ever reach page rendering; bindings keep rendering the
/// resolved value whatever the session reports.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A change was staged or committed outside edit mode.
    #[error("not in edit mode")]
    NotEditing,

    /// The authorization collaborator refused edit mode.
    #[error("editing is not authorized")]
    Unauthorized,

    /// A commit for this session is already running.
    #[error("a commit is already in flight")]
    CommitInFlight,

    /// The gateway did not acknowledge every entry of the batch.
    #[error("{} of {total} changes were not saved", .failures.len())]
    CommitRejected {
        failures: Vec<EntryFailure>,
        total: usize,
    },

    /// The gateway failed as a whole (unreachable, timed out, ...).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid key or value.
    #[error("invalid content: {0}")]
    Content(#[from] pagecraft_types::Error),

    /// A repeater operation addressed an item that does not exist.
    #[error("index {index} out of range for list of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
