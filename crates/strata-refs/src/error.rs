//! Error types for reference operations.

use strata_store::{ObjectKind, StoreError};
use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The name did not resolve to any ref or object.
    #[error("not a valid object name: {name}")]
    NotFound { name: String },

    /// An abbreviated fingerprint matched more than one object.
    #[error("short object name {name} is ambiguous")]
    Ambiguous { name: String },

    /// The name resolved, but not to something that peels to a tree.
    #[error("{name} resolves to a {kind}, not a tree")]
    NotATree { name: String, kind: ObjectKind },

    /// The ref name is invalid.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A tag is immutable and cannot be updated.
    #[error("tag is immutable: {name}")]
    TagImmutable { name: String },

    /// A ref file exists but its contents cannot be parsed.
    #[error("corrupt ref {name}: {reason}")]
    Corrupt { name: String, reason: String },

    /// Object store failure while peeling a ref.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
