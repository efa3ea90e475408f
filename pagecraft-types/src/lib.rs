//! Core type definitions for Pagecraft.
//!
//! This crate defines the types shared by the content store, the resolver
//! and the edit session:
//! - [`ContentKey`]: the `(page, section, field)` address of an overridable value
//! - [`ContentValue`] / [`ValueKind`]: the closed set of value tags
//! - [`ContentTree`]: the per-page read model built from stored rows
//! - [`PendingChange`] / [`PendingBuffer`]: staged, uncommitted edits
//!
//! Nothing here performs I/O. Page layout and rendering concerns live in the
//! consuming site, not here.

mod ids;
mod key;
mod pending;
mod tree;
mod value;

pub use ids::SessionId;
pub use key::{ContentKey, FieldPath, PathSegment};
pub use pending::{PendingBuffer, PendingChange};
pub use tree::{ContentField, ContentTree, SectionMap, StoredRow};
pub use value::{ContentValue, ValueKind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid content key: {0}")]
    InvalidKey(String),

    #[error("unknown content type: {0}")]
    UnknownKind(String),
}
