//! Error types for listing.

use std::path::PathBuf;

use strata_index::IndexError;
use strata_pathspec::PathspecError;
use strata_refs::RefError;
use strata_store::StoreError;
use strata_worktree::WorktreeError;

/// Errors that end a listing run.
#[derive(Debug, thiserror::Error)]
pub enum LsError {
    /// Two requested options cannot be combined.
    #[error("{0}")]
    IncompatibleOptions(String),

    /// Ignored output was requested with nothing to decide what is ignored.
    #[error("ls-files --ignored needs some exclude pattern")]
    IgnoredWithoutExcludes,

    /// No repository directory was found at or above the given path.
    #[error("not a strata repository (or any of the parent directories): {}", .0.display())]
    NotARepository(PathBuf),

    /// The repository configuration file could not be parsed.
    #[error("bad config file {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Pathspec(#[from] PathspecError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Worktree(#[from] WorktreeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Refs(#[from] RefError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for listing results.
pub type Result<T> = std::result::Result<T, LsError>;
