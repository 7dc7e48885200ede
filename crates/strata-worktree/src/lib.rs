//! Working-tree access for strata.
//!
//! - [`ExclusionOracle`] -- compiled ignore rules answering "is this path
//!   excluded"
//! - [`DirectoryScanner`] -- one pass over the work tree yielding untracked
//!   [`DirectoryEntry`] values

pub mod error;
pub mod exclude;
pub mod scanner;

pub use error::{Result, WorktreeError};
pub use exclude::{ExcludeSources, ExclusionOracle};
pub use scanner::{DirectoryEntry, DirectoryScanner, Scan, ScanOptions, REPO_DIR_NAME};
