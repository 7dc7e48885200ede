use strata_types::ObjectId;

/// Failures reading or writing objects.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Stored bytes no longer hash to the ID they were filed under.
    #[error("object {id} is damaged: its content hashes to {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    #[error("cannot encode or decode object: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The object exists but is not what the caller asked for, or its
    /// header is unreadable.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    #[error("refusing to store an object whose ID is null")]
    NullObjectId,
}

pub type StoreResult<T> = Result<T, StoreError>;
