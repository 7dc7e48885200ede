//! Error types for path filters.

/// Errors produced while building or applying path filters.
#[derive(Debug, thiserror::Error)]
pub enum PathspecError {
    /// The argument resolves to a location above the work tree root.
    #[error("'{path}' is outside repository")]
    OutsideRepository { path: String },

    /// A wildcard argument could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A caller passed a prefix length that does not leave any of the path
    /// to match against.
    #[error("prefix length {prefix_len} is not shorter than path '{path}'")]
    PrefixNotSuperset { path: String, prefix_len: usize },
}

/// Convenience alias for path filter results.
pub type Result<T> = std::result::Result<T, PathspecError>;
