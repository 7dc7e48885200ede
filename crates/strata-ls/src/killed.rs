//! Untracked paths that would block materializing the index.

use strata_index::{Collision, IndexView};
use strata_worktree::DirectoryEntry;

/// Whether `entry` would have to be removed to check out the index: a file
/// where the index needs a directory, or a directory where it needs a file.
pub fn is_killed(entry: &DirectoryEntry, index: &IndexView) -> bool {
    index.collision(&entry.path) != Collision::None
}
