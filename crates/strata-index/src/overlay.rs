//! Overlaying a historical snapshot onto an in-memory index.
//!
//! The overlay runs four steps, each a precondition for the next:
//!
//! 1. hoist every unmerged entry to stage 3, freeing stages 1 and 2;
//! 2. resolve the snapshot name to a tree;
//! 3. read the tree into the index at stage 1, under a literal prefix;
//! 4. collapse: a stage-0 entry with a stage-1 twin is suppressed, of
//!    several stage-3 entries for one path only the first is kept visible,
//!    and a stage-1 entry for a conflicted path gives way to the conflict.
//!
//! Nothing is written back to disk. A failure in steps 2 or 3 leaves the
//! view half-updated; callers must treat it as fatal.

use strata_refs::{resolve_tree, RefError, RefStore};
use strata_store::ObjectStore;
use tracing::{debug, info};

use crate::entry::Stage;
use crate::error::{IndexError, IndexResult};
use crate::index::{IndexView, Suppression};

/// Counts describing what an overlay did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlaySummary {
    pub hoisted: usize,
    pub read: usize,
    pub superseded: usize,
    pub duplicates: usize,
    /// Snapshot entries hidden behind a conflict on the same path.
    pub conflicts: usize,
}

/// Applies snapshots from a store onto index views.
pub struct SnapshotOverlay<'a> {
    store: &'a dyn ObjectStore,
    refs: &'a dyn RefStore,
}

impl<'a> SnapshotOverlay<'a> {
    pub fn new(store: &'a dyn ObjectStore, refs: &'a dyn RefStore) -> Self {
        Self { store, refs }
    }

    /// Overlay snapshot `name`, restricted to paths starting with `prefix`,
    /// onto `view`.
    pub fn apply(&self, name: &str, prefix: &str, view: &mut IndexView) -> IndexResult<OverlaySummary> {
        let hoisted = view.hoist_unmerged();
        debug!(hoisted, "hoisted unmerged entries");

        let tree = resolve_tree(self.refs, self.store, name).map_err(|e| snapshot_error(name, e))?;
        let read = view.read_tree(self.store, &tree, Stage::Base, prefix)?;
        let Collapsed {
            superseded,
            duplicates,
            conflicts,
        } = collapse(view);

        info!(
            snapshot = name,
            %tree,
            hoisted,
            read,
            superseded,
            duplicates,
            conflicts,
            "applied snapshot overlay"
        );
        Ok(OverlaySummary {
            hoisted,
            read,
            superseded,
            duplicates,
            conflicts,
        })
    }
}

fn snapshot_error(name: &str, err: RefError) -> IndexError {
    match err {
        RefError::NotFound { .. } => IndexError::SnapshotNotFound(name.to_string()),
        RefError::NotATree { kind, .. } => IndexError::InvalidSnapshot {
            name: name.to_string(),
            reason: format!("{kind} is not a tree"),
        },
        RefError::Store(e) => IndexError::Store(e),
        other => IndexError::InvalidSnapshot {
            name: name.to_string(),
            reason: other.to_string(),
        },
    }
}

#[derive(Default)]
struct Collapsed {
    superseded: usize,
    duplicates: usize,
    conflicts: usize,
}

/// Mark superseded stage-0 entries, hoisted duplicates, and snapshot entries
/// shadowed by a conflict. Entries of one path sit together, ordered by
/// stage, so one pass remembering the last stage-0, stage-1 and stage-3
/// entries sees every pair.
fn collapse(view: &mut IndexView) -> Collapsed {
    let mut marks = Vec::new();
    {
        let entries = view.entries();
        let same_path = |pos: Option<usize>, path: &str| pos.filter(|&p| entries[p].path == path);
        let mut last_merged = None;
        let mut last_base = None;
        let mut last_theirs = None;
        for (pos, entry) in entries.iter().enumerate() {
            match entry.stage {
                Stage::Merged => last_merged = Some(pos),
                Stage::Base => {
                    if let Some(m) = same_path(last_merged, &entry.path) {
                        marks.push((m, Suppression::SupersededBySnapshot));
                    }
                    last_base = Some(pos);
                }
                Stage::Theirs => {
                    if same_path(last_theirs, &entry.path).is_some() {
                        marks.push((pos, Suppression::HoistedDuplicate));
                    } else if let Some(b) = same_path(last_base, &entry.path) {
                        marks.push((b, Suppression::ConflictedInIndex));
                    }
                    last_theirs = Some(pos);
                }
                Stage::Ours => {}
            }
        }
    }

    let mut counts = Collapsed::default();
    for (pos, reason) in marks {
        match reason {
            Suppression::SupersededBySnapshot => counts.superseded += 1,
            Suppression::HoistedDuplicate => counts.duplicates += 1,
            Suppression::ConflictedInIndex => counts.conflicts += 1,
        }
        view.suppress(pos, reason);
    }
    counts
}
