//! Error types for working-tree access.

use std::path::PathBuf;

/// Errors raised while compiling exclusion rules or scanning.
#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    /// An exclude file named on the command line could not be used.
    #[error("cannot use {} as an exclude file: {reason}", path.display())]
    ExcludeFile { path: PathBuf, reason: String },

    /// An exclude pattern could not be compiled.
    #[error("invalid exclude pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for working-tree results.
pub type Result<T> = std::result::Result<T, WorktreeError>;
