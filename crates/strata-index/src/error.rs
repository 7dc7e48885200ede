//! Error types for the index crate.

use strata_types::ObjectId;

use crate::entry::Stage;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The persisted index could not be decoded.
    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// Two entries share the same path and stage.
    #[error("duplicate index entry for '{path}' at stage {stage}")]
    DuplicateEntry { path: String, stage: Stage },

    /// The snapshot name did not resolve to anything.
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// The snapshot name resolved to something that is not a tree.
    #[error("invalid snapshot '{name}': {reason}")]
    InvalidSnapshot { name: String, reason: String },

    /// An object referenced by a tree was not found in the store.
    #[error("object not found in store: {0}")]
    ObjectNotFound(ObjectId),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] strata_store::StoreError),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error reading or writing the index file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
